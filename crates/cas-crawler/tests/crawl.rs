mod common;

use std::sync::{Arc, Mutex};

use cas_crawler::{crawl_site, gather_ad_urls, OnError, PageLocation, Scrapable, Seed};
use cas_search::page_url;
use common::{ad_url, quiet_config, results_page, FakeSite};

const SEARCH: &str = "https://suchen.mobile.de/fahrzeuge/search.html?vc=Car";

#[derive(Clone, Default)]
struct Collected(Arc<Mutex<Vec<String>>>);

struct CollectingScraper {
    collected: Collected,
}

impl Scrapable for CollectingScraper {
    type Config = Collected;

    fn new(config: &Self::Config) -> anyhow::Result<Self> {
        Ok(Self {
            collected: config.clone(),
        })
    }

    fn scrap(&mut self, page: String, location: &PageLocation) -> anyhow::Result<()> {
        if page.contains("broken") {
            anyhow::bail!("Unexpected layout");
        }
        self.collected.0.lock().unwrap().push(location.to_string());
        Ok(())
    }
}

fn site() -> FakeSite {
    FakeSite::default()
        .with(SEARCH, results_page(Some(60), &[1, 2], 3))
        .with(page_url(SEARCH, 2), results_page(Some(60), &[2, 3], 3))
        .with(page_url(SEARCH, 3), results_page(Some(60), &[], 3))
        .with(ad_url(1), "<html><body>ad 1</body></html>")
        .with(ad_url(2), "<html><body>ad 2</body></html>")
}

#[tokio::test]
async fn gather_visits_every_page() {
    let site = site();
    let links = gather_ad_urls(&quiet_config(), &site, &[SEARCH]).await.unwrap();

    assert_eq!(vec![ad_url(1), ad_url(2), ad_url(2), ad_url(3)], links);
    assert_eq!(
        vec![
            SEARCH.to_string(),
            page_url(SEARCH, 2),
            page_url(SEARCH, 3)
        ],
        site.hits()
    );
}

#[tokio::test]
async fn crawl_dedupes_and_skips_errors() {
    let site = site();
    let collected = Collected::default();

    let stats = crawl_site::<CollectingScraper, _>(
        &quiet_config(),
        &collected,
        &site,
        Seed::Searches(vec![SEARCH.into()]),
    )
    .await
    .unwrap();

    assert_eq!(4, stats.links);
    assert_eq!(3, stats.ads);
    assert_eq!(2, stats.downloaded);
    assert_eq!(1, stats.download_errors);
    assert_eq!(2, stats.scraped);
    assert_eq!(0, stats.scrap_errors);

    let mut scraped = collected.0.lock().unwrap().clone();
    scraped.sort();
    assert_eq!(vec![ad_url(1), ad_url(2)], scraped);
}

#[tokio::test]
async fn crawl_ads_seed_counts_scrap_errors() {
    let site = FakeSite::default()
        .with(ad_url(1), "fine")
        .with(ad_url(2), "broken");
    let collected = Collected::default();

    let stats = crawl_site::<CollectingScraper, _>(
        &quiet_config(),
        &collected,
        &site,
        Seed::Ads(vec![ad_url(1), ad_url(2), ad_url(1)]),
    )
    .await
    .unwrap();

    assert_eq!(3, stats.links);
    assert_eq!(2, stats.ads);
    assert_eq!(1, stats.scraped);
    assert_eq!(1, stats.scrap_errors);
}

#[tokio::test]
async fn crawl_fails_on_scrap_error() {
    let site = FakeSite::default().with(ad_url(7), "broken");
    let mut conf = quiet_config();
    conf.on_scrap_error = OnError::Fail;

    let res = crawl_site::<CollectingScraper, _>(
        &conf,
        &Collected::default(),
        &site,
        Seed::Ads(vec![ad_url(7)]),
    )
    .await;
    assert!(res.is_err());
}

#[tokio::test]
async fn crawl_fails_on_download_error() {
    let mut conf = quiet_config();
    conf.on_dl_error = OnError::Fail;

    let res = crawl_site::<CollectingScraper, _>(
        &conf,
        &Collected::default(),
        &FakeSite::default(),
        Seed::Ads(vec![ad_url(1)]),
    )
    .await;
    assert!(res.is_err());
}
