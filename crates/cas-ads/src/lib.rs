mod record;
mod scraper;
pub mod writer;

pub use record::AdRecord;
pub use scraper::{location_id, scrap_glob, scrap_page, AdScraper, AdScraperConfig};
pub use writer::{FileMode, Output, RecordSink};

pub use anyhow;
