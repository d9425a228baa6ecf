use std::collections::HashSet;

use lazy_static::lazy_static;
use sws_scraper::{Html, Selector};

const AD_HOST: &str = "suchen.mobile.de";

lazy_static! {
    static ref RESULT_COUNT: Selector =
        Selector::parse("h1.h2.u-text-orange.rbt-result-list-headline").unwrap();
    static ref PAGE_BUTTON: Selector = Selector::parse("span.btn.btn--muted.btn--s").unwrap();
    static ref AD_LINK: Selector =
        Selector::parse("a.link--muted.no--text--decoration.result-item").unwrap();
}

/// What a search result page tells about the search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Total number of results announced in the headline
    pub result_count: Option<u32>,
    /// Highest page number offered by the pager, 1 without a pager
    pub last_page: u32,
    pub ad_links: Vec<String>,
}

impl SearchPage {
    pub fn parse(page: &str) -> Self {
        let html = Html::parse_document(page);

        let result_count = html
            .select(RESULT_COUNT.clone())
            .next()
            .and_then(|h1| parse_count(&h1.inner_text()));

        let last_page = html
            .select(PAGE_BUTTON.clone())
            .filter_map(|span| span.inner_text().trim().parse::<u32>().ok())
            .max()
            .unwrap_or(1);

        let ad_links = html
            .select(AD_LINK.clone())
            .filter_map(|a| a.map_value(|e| e.attr("href").map(String::from)).flatten())
            .filter(|href| href.contains(AD_HOST))
            .collect();

        Self {
            result_count,
            last_page,
            ad_links,
        }
    }
}

// "1.234 Angebote" -> 1234
fn parse_count(headline: &str) -> Option<u32> {
    headline
        .split_whitespace()
        .next()
        .map(|n| n.replace('.', ""))
        .and_then(|n| n.parse().ok())
}

/// Returns the value of the `id` query parameter of an ad URL.
pub fn ad_id(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Keeps the first URL seen for every ad id, preserving order.
pub fn unique_ads<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for url in urls {
        let url = url.as_ref();
        match ad_id(url) {
            Some(id) => {
                if seen.insert(id.to_string()) {
                    unique.push(url.to_string());
                }
            }
            None => log::warn!("Skipping URL without ad id: {url}"),
        }
    }
    unique
}

/// Trims and collapses whitespace runs to a single space.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
