use anyhow::{Context, Result};
use cas_search::{page_url, SearchPage};
use futures::{stream, StreamExt};

use crate::config::{CrawlerConfig, OnError};
use crate::fetch::Fetch;

/// Walks every result page of every search and collects the ad links found.
pub async fn gather_ad_urls<F, S>(
    config: &CrawlerConfig,
    fetcher: &F,
    search_urls: &[S],
) -> Result<Vec<String>>
where
    F: Fetch,
    S: AsRef<str>,
{
    let mut links = Vec::new();
    for url in search_urls {
        let url = url.as_ref();
        match search_links(config, fetcher, url).await {
            Ok(found) => {
                log::info!("Found {} ad links under {url}", found.len());
                links.extend(found);
            }
            Err(e) => match config.on_dl_error {
                OnError::Fail => return Err(e),
                OnError::SkipAndLog => log::warn!("Skipping search {url}: {e:#}"),
            },
        }
    }
    Ok(links)
}

async fn search_links<F>(config: &CrawlerConfig, fetcher: &F, url: &str) -> Result<Vec<String>>
where
    F: Fetch,
{
    let first = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Couldn't download {url}"))?;
    let first = SearchPage::parse(&first);
    warn_if_empty(url, &first);

    let mut links = first.ad_links;
    let results = stream::iter(2..=first.last_page)
        .map(|n| {
            let page_url = page_url(url, n);
            async move {
                let page = fetcher.fetch(&page_url).await;
                (page_url, page)
            }
        })
        .buffered(config.concurrency())
        .collect::<Vec<_>>()
        .await;

    for (page_url, page) in results {
        match page {
            Ok(page) => {
                let page = SearchPage::parse(&page);
                warn_if_empty(&page_url, &page);
                links.extend(page.ad_links);
            }
            Err(e) => match config.on_dl_error {
                OnError::Fail => {
                    return Err(e.context(format!("Couldn't download {page_url}")));
                }
                OnError::SkipAndLog => log::warn!("Skipping page {page_url}: {e}"),
            },
        }
    }

    Ok(links)
}

fn warn_if_empty(url: &str, page: &SearchPage) {
    if page.ad_links.is_empty() {
        log::warn!("No URLs found under {url}. You may be blocked!");
    }
}
