#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use cas_crawler::{CrawlerConfig, Fetch};

/// An in-memory site, unknown URLs fail like a 404
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    hits: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn with(mut self, url: impl Into<String>, page: impl Into<String>) -> Self {
        self.pages.insert(url.into(), page.into());
        self
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Fetch for FakeSite {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.hits.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 Not Found: {url}"))
    }
}

pub fn results_page(count: Option<u32>, ad_ids: &[u32], last_page: u32) -> String {
    let headline = count
        .map(|n| {
            format!(r#"<h1 class="h2 u-text-orange rbt-result-list-headline">{n} Angebote</h1>"#)
        })
        .unwrap_or_default();
    let links = ad_ids
        .iter()
        .map(|id| {
            format!(
                r#"<a class="link--muted no--text--decoration result-item" href="{}">ad</a>"#,
                ad_url(*id).replace('&', "&amp;")
            )
        })
        .collect::<String>();
    let pager = (1..=last_page)
        .map(|n| format!(r#"<span class="btn btn--muted btn--s">{n}</span>"#))
        .collect::<String>();
    format!("<html><body>{headline}<div>{links}</div><div>{pager}</div></body></html>")
}

pub fn ad_url(id: u32) -> String {
    format!("https://suchen.mobile.de/fahrzeuge/details.html?id={id}&action=eyeCatcher")
}

pub fn quiet_config() -> CrawlerConfig {
    CrawlerConfig {
        num_workers: 2,
        handle_sigint: false,
        ..Default::default()
    }
}
