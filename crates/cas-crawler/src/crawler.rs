use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Error, Result};
use cas_search::unique_ads;
use futures::{stream, StreamExt};

use crate::config::{CrawlerConfig, OnError};
use crate::fetch::Fetch;
use crate::plan::plan_searches;
use crate::scrapable::{PageLocation, Scrapable, Seed};
use crate::search::gather_ad_urls;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Ad links found on search pages, duplicates included
    pub links: usize,
    /// Unique ads
    pub ads: usize,
    pub downloaded: usize,
    pub download_errors: usize,
    pub scraped: usize,
    pub scrap_errors: usize,
}

#[derive(Debug)]
struct Page {
    page: String,
    location: PageLocation,
}

pub async fn crawl_site<T, F>(
    crawler_conf: &CrawlerConfig,
    scraper_conf: &T::Config,
    fetcher: &F,
    seed: Seed,
) -> Result<CrawlStats>
where
    T: Scrapable,
    F: Fetch,
{
    let links = match seed {
        Seed::Query(query) => {
            let searches = plan_searches(crawler_conf, fetcher, &query).await?;
            gather_ad_urls(crawler_conf, fetcher, &searches).await?
        }
        Seed::Searches(urls) => gather_ad_urls(crawler_conf, fetcher, &urls).await?,
        Seed::Ads(urls) => urls,
    };
    let ads = unique_ads(&links);
    log::info!("Found {} unique ads out of {} links", ads.len(), links.len());

    let mut stats = CrawlStats {
        links: links.len(),
        ads: ads.len(),
        ..Default::default()
    };
    if ads.is_empty() {
        return Ok(stats);
    }

    let total = ads.len();
    let done = Arc::new(AtomicUsize::new(0));
    let scraped = Arc::new(AtomicUsize::new(0));
    let scrap_errors = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(AtomicBool::new(false));

    let (tx_page, rx_page) = crossbeam_channel::bounded::<Page>(crawler_conf.page_buffer.max(1));

    // Workers

    let mut workers = vec![];
    for id in 0..crawler_conf.num_workers.max(1) {
        let rx_page = rx_page.clone();
        let scraper_conf = scraper_conf.clone();
        let on_scrap_error = crawler_conf.on_scrap_error;
        let done = done.clone();
        let scraped = scraped.clone();
        let scrap_errors = scrap_errors.clone();
        let stop = stop.clone();
        let worker = thread::Builder::new()
            .name(format!("{id}"))
            .spawn(move || {
                let mut scraper = <T as Scrapable>::new(&scraper_conf)?;
                for Page { page, location } in rx_page {
                    match scraper.scrap(page, &location) {
                        Ok(()) => {
                            scraped.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => match on_scrap_error {
                            OnError::SkipAndLog => {
                                log::error!("Skipping scrap for page {location} got: {e}");
                                scrap_errors.fetch_add(1, Ordering::SeqCst);
                            }
                            OnError::Fail => {
                                stop.store(true, Ordering::SeqCst);
                                scraper.finalizer();
                                return Err(e.context(format!("Couldn't scrap {location}")));
                            }
                        },
                    }
                    let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                    log::info!("Completed {}%", n * 100 / total);
                }
                scraper.finalizer();
                Ok::<(), Error>(())
            })?;
        workers.push(worker);
    }
    drop(rx_page);

    // Downloader

    let downloader = async {
        let mut downloaded = 0usize;
        let mut download_errors = 0usize;
        let mut pages = pin!(stream::iter(ads)
            .map(|url| async move {
                let page = fetcher.fetch(&url).await;
                (url, page)
            })
            .buffer_unordered(crawler_conf.concurrency()));

        while let Some((url, page)) = pages.next().await {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            match page {
                Ok(page) => {
                    downloaded += 1;
                    let location = PageLocation::Url(url);
                    if tx_page.send(Page { page, location }).is_err() {
                        break;
                    }
                }
                Err(e) => match crawler_conf.on_dl_error {
                    OnError::Fail => {
                        return Err(e.context(format!("Couldn't download {url}")));
                    }
                    OnError::SkipAndLog => {
                        log::warn!("Skipping URL: {url} got: {e}");
                        download_errors += 1;
                    }
                },
            }
        }

        Ok::<_, Error>((downloaded, download_errors))
    };

    let downloaded = if crawler_conf.handle_sigint {
        tokio::select! {
            res = downloader => res,
            _ = tokio::signal::ctrl_c() => Err(anyhow!("Interrupted")),
        }
    } else {
        downloader.await
    };
    drop(tx_page);

    let workers = tokio::task::spawn_blocking(move || {
        for w in workers {
            w.join()
                .map_err(|_| anyhow!("Scraping worker panicked"))??;
        }
        Ok::<(), Error>(())
    })
    .await?;

    let (downloaded, download_errors) = downloaded?;
    workers?;

    stats.downloaded = downloaded;
    stats.download_errors = download_errors;
    stats.scraped = scraped.load(Ordering::SeqCst);
    stats.scrap_errors = scrap_errors.load(Ordering::SeqCst);
    log::info!("{stats:?}");

    Ok(stats)
}
