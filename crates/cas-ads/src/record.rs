use std::collections::BTreeMap;

use cas_search::clean_text;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sws_scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref TECHNICAL_DATA: Selector =
        Selector::parse("div.cBox-body.cBox-body--technical-data").unwrap();
    static ref FEATURES: Selector = Selector::parse("div#rbt-features").unwrap();
    static ref TITLE: Selector = Selector::parse("h1#rbt-ad-title").unwrap();
    static ref SELLER_ADDRESS: Selector = Selector::parse("p#rbt-seller-address").unwrap();
    static ref PRICE: Selector =
        Selector::parse("div.g-col-6.vip-price-rating__tech-details").unwrap();
    static ref TECHNICAL_ROW: Selector = Selector::parse("div.g-row.u-margin-bottom-9").unwrap();
    static ref CELL: Selector = Selector::parse("div.g-col-6").unwrap();
}

pub const PRICE_KEY: &str = "price";

/// Attributes scraped from a single ad page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub title: Option<String>,

    #[serde(rename = "rbt_features")]
    pub features: Option<Vec<String>>,

    pub technical_data: Option<BTreeMap<String, String>>,

    #[serde(rename = "loc")]
    pub location: Option<String>,

    pub scraped_at: DateTime<Utc>,
}

impl AdRecord {
    /// Extracts an ad from its page, `None` when the page has neither
    /// technical data nor features (removed ad, captcha, ...).
    pub fn parse(page: &str, id: &str) -> Option<Self> {
        let html = Html::parse_document(page);

        let technical_data = html.select(TECHNICAL_DATA.clone()).next();
        let features = html.select(FEATURES.clone()).next();
        if technical_data.is_none() && features.is_none() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            url: None,
            title: first_text(&html, &TITLE),
            features: features.as_ref().map(extract_features),
            technical_data: technical_data.as_ref().map(extract_technical_data),
            location: first_text(&html, &SELLER_ADDRESS),
            scraped_at: Utc::now(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The price in whole euros, "12.345" is read as 12345.
    pub fn price(&self) -> Option<u32> {
        let price = self.technical_data.as_ref()?.get(PRICE_KEY)?;
        let digits: String = price.chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}

fn first_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector.clone())
        .next()
        .map(|e| clean_text(&e.inner_text()))
}

fn extract_technical_data(section: &ElementRef) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    let prices = section.select(PRICE.clone()).collect::<Vec<_>>();
    match prices.as_slice() {
        [price] => {
            let text = price.inner_text();
            let amount = text.split('€').next().unwrap_or_default();
            data.insert(PRICE_KEY.to_string(), clean_text(amount));
        }
        _ => log::warn!("Price was not identified"),
    }

    for row in section.select(TECHNICAL_ROW.clone()) {
        let mut cells = row.select(CELL.clone());
        match (cells.next(), cells.next()) {
            (Some(name), Some(value)) => {
                data.insert(
                    clean_text(&name.inner_text()),
                    clean_text(&value.inner_text()),
                );
            }
            _ => log::debug!("Skipping technical row without name and value"),
        }
    }

    data
}

fn extract_features(section: &ElementRef) -> Vec<String> {
    section
        .select(CELL.clone())
        .map(|cell| clean_text(&cell.inner_text()))
        .filter(|feature| !feature.is_empty())
        .collect()
}
