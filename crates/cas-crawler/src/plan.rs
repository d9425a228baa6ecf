use std::collections::VecDeque;

use anyhow::{Context, Result};
use cas_search::{price_slices, PriceRange, SearchPage, SearchQuery};

use crate::config::{CrawlerConfig, OnError};
use crate::fetch::Fetch;

/// Turns a query into search URLs that each stay under the result cap.
///
/// When the query exceeds the cap its price range is cut into fixed-width
/// slices. With `partition.refine` every slice is counted as well, empty ones
/// are dropped and those still above the cap are bisected.
pub async fn plan_searches<F>(
    config: &CrawlerConfig,
    fetcher: &F,
    query: &SearchQuery,
) -> Result<Vec<String>>
where
    F: Fetch,
{
    let url = query.url();
    let page = fetcher
        .fetch(&url)
        .await
        .with_context(|| format!("Couldn't download search {url}"))?;
    let cap = config.partition.result_cap;

    let count = match SearchPage::parse(&page).result_count {
        Some(count) => count,
        None => {
            log::warn!("Couldn't read the number of results of {url}");
            return Ok(vec![url]);
        }
    };
    if count <= cap {
        log::info!("Found {count} results for {url}");
        return Ok(vec![url]);
    }

    let Some(max) = query.price.max else {
        log::warn!(
            "Found {count} results but no maximum price to partition on, only {cap} are reachable"
        );
        return Ok(vec![url]);
    };
    let range = PriceRange::new(query.price.min.unwrap_or(0), max);
    if range.min > range.max {
        anyhow::bail!(
            "Minimum price {} is above maximum price {}",
            range.min,
            range.max
        );
    }
    let slices = price_slices(range, config.partition.slice_width);
    log::info!(
        "Found {count} results, partitioning prices {}-{} into {} searches",
        range.min,
        range.max,
        slices.len()
    );

    if !config.partition.refine {
        return Ok(slices
            .into_iter()
            .map(|slice| query.with_price(slice).url())
            .collect());
    }

    refine(config, fetcher, query, slices).await
}

async fn refine<F>(
    config: &CrawlerConfig,
    fetcher: &F,
    query: &SearchQuery,
    slices: Vec<PriceRange>,
) -> Result<Vec<String>>
where
    F: Fetch,
{
    let cap = config.partition.result_cap;
    let mut pending = VecDeque::from(slices);
    let mut urls = Vec::new();

    while let Some(slice) = pending.pop_front() {
        let url = query.with_price(slice).url();
        let count = match fetcher.fetch(&url).await {
            Ok(page) => SearchPage::parse(&page).result_count,
            Err(e) => match config.on_dl_error {
                OnError::Fail => return Err(e.context(format!("Couldn't count results of {url}"))),
                OnError::SkipAndLog => {
                    log::warn!("Keeping slice {}-{} unrefined: {e}", slice.min, slice.max);
                    urls.push(url);
                    continue;
                }
            },
        };

        match count {
            Some(0) => log::debug!("No results for prices {}-{}", slice.min, slice.max),
            Some(n) if n > cap => match slice.bisect() {
                Some((low, high)) => {
                    log::debug!("{n} results for prices {}-{}, bisecting", slice.min, slice.max);
                    pending.push_front(high);
                    pending.push_front(low);
                }
                None => {
                    log::warn!("{n} results priced {} cannot be split further", slice.min);
                    urls.push(url);
                }
            },
            _ => urls.push(url),
        }
    }

    Ok(urls)
}
