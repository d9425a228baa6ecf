use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context};
use cas_crawler::{OnError, PageLocation, Scrapable};
use cas_search::ad_id;
use crossbeam_channel::{unbounded, Sender};

use crate::record::AdRecord;

#[derive(Debug, Clone)]
pub struct AdScraperConfig {
    pub tx_record: Sender<AdRecord>,
}

pub struct AdScraper {
    tx_record: Sender<AdRecord>,
}

impl Scrapable for AdScraper {
    type Config = AdScraperConfig;

    fn new(config: &AdScraperConfig) -> anyhow::Result<Self> {
        Ok(Self {
            tx_record: config.tx_record.clone(),
        })
    }

    fn scrap(&mut self, page: String, location: &PageLocation) -> anyhow::Result<()> {
        let id = location_id(location)
            .ok_or_else(|| anyhow!("Couldn't find the ad id of {location}"))?;
        self.scrap_with_id(page, location, &id)
    }
}

impl AdScraper {
    /// Scraps a page whose ad id is known, whatever its location.
    pub fn scrap_with_id(
        &mut self,
        page: String,
        location: &PageLocation,
        id: &str,
    ) -> anyhow::Result<()> {
        let Some(record) = AdRecord::parse(&page, id) else {
            log::warn!("No ad data found under {location}");
            return Ok(());
        };
        let record = match location {
            PageLocation::Url(url) => record.with_url(url),
            PageLocation::Path(_) => record,
        };

        self.tx_record
            .send(record)
            .map_err(|_| anyhow!("Record writer is gone"))
    }
}

/// The ad id of a page: the `id` parameter of its URL, or for a saved page
/// the digits of its file name (`ad_123.html`), falling back to the file stem.
pub fn location_id(location: &PageLocation) -> Option<String> {
    match location {
        PageLocation::Url(url) => ad_id(url).map(String::from),
        PageLocation::Path(path) => {
            let stem = path.file_stem()?.to_str()?;
            let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                Some(stem.to_string())
            } else {
                Some(digits)
            }
        }
    }
}

pub fn scrap_page(
    config: &AdScraperConfig,
    page: String,
    location: PageLocation,
) -> anyhow::Result<()> {
    let mut scraper = AdScraper::new(config)?;
    scraper.scrap(page, &location)?;
    scraper.finalizer();
    Ok(())
}

/// Scraps saved ad pages matching `pattern` on `num_workers` threads.
///
/// Pages that can't be read or scraped, and paths the glob can't walk, are
/// handled according to `on_error`.
pub fn scrap_glob(
    config: &AdScraperConfig,
    pattern: &str,
    on_error: OnError,
    num_workers: usize,
) -> anyhow::Result<()> {
    let paths = glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern:?}"))?;
    let (tx_path, rx_path) = unbounded::<PathBuf>();

    let mut workers = vec![];
    for id in 0..num_workers.max(1) {
        let rx_path = rx_path.clone();
        let config = config.clone();
        let worker = thread::Builder::new()
            .name(format!("{id}"))
            .spawn(move || {
                let mut scraper = AdScraper::new(&config)?;
                for path in rx_path.into_iter() {
                    match scrap_file(&mut scraper, path) {
                        Ok(()) => (),
                        Err(e) => match on_error {
                            OnError::SkipAndLog => {
                                log::error!("Skipping page scrap: {e:#}");
                            }
                            OnError::Fail => {
                                return Err(e);
                            }
                        },
                    }
                }
                Ok::<(), anyhow::Error>(())
            })?;
        workers.push(worker);
    }
    drop(rx_path);

    let mut glob_error = None;
    for path in paths {
        match path {
            Ok(path) => {
                // Every worker stopped on an error
                if tx_path.send(path).is_err() {
                    break;
                }
            }
            Err(e) => match on_error {
                OnError::SkipAndLog => log::error!("Skipping path: {e}"),
                OnError::Fail => {
                    glob_error = Some(e);
                    break;
                }
            },
        }
    }
    drop(tx_path);

    for w in workers {
        w.join()
            .map_err(|_| anyhow!("Scraping worker panicked"))??;
    }

    match glob_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

// Saved pages are not always UTF-8, invalid bytes are replaced.
fn scrap_file(scraper: &mut AdScraper, path: PathBuf) -> anyhow::Result<()> {
    let page = String::from_utf8_lossy(&fs_err::read(&path)?).into_owned();
    scraper.scrap(page, &PageLocation::Path(path))
}
