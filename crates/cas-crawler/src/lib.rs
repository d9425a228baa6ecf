mod config;
mod crawler;
mod fetch;
mod plan;
mod scrapable;
mod search;

pub use config::{CrawlerConfig, OnError, Throttle};
pub use crawler::{crawl_site, CrawlStats};
pub use fetch::{Fetch, HttpFetcher};
pub use plan::plan_searches;
pub use scrapable::{PageLocation, Scrapable, Seed};
pub use search::gather_ad_urls;

pub use anyhow;
pub use cas_search;
