use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::catalog::MakeFilter;
use crate::partition::PriceRange;

pub const DEFAULT_SEARCH_URL: &str = "https://suchen.mobile.de/fahrzeuge/search.html?dam=0&isSearchRequest=true&sfmr=false&vc=Car&sortOption.sortBy=creationTime&sortOption.sortOrder=DESCENDING";

const SELLER_TYPE_ARG: &str = "adLimitation";
const COUNTRY_ARG: &str = "ce";
const MIN_PRICE_ARG: &str = "minPrice";
const MAX_PRICE_ARG: &str = "maxPrice";
const MIN_POWER_ARG: &str = "minPowerAsArray";
const MAX_POWER_ARG: &str = "maxPowerAsArray";
const POWER_UNIT: &str = "PS";
const MIN_FIRST_REGISTRATION_ARG: &str = "minFirstRegistrationDate";
const MAX_FIRST_REGISTRATION_ARG: &str = "maxFirstRegistrationDate";
const MIN_MILEAGE_ARG: &str = "minMileage";
const MAX_MILEAGE_ARG: &str = "maxMileage";
const MAKE_MODEL_ARG: &str = "ms";
const PAGE_NUMBER_ARG: &str = "pageNumber";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SellerType {
    Private,
    #[cfg_attr(feature = "clap", value(alias = "seller"))]
    Dealer,
    Company,
}

impl SellerType {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Private => "ONLY_FSBO_ADS",
            Self::Dealer => "ONLY_DEALER_ADS",
            Self::Company => "ONLY_COMMERCIAL_FSBO_ADS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Country {
    #[cfg_attr(feature = "clap", value(alias = "de"))]
    Germany,
}

impl Country {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Germany => "DE",
        }
    }
}

/// An optional inclusive `[min, max]` filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

impl Bounds {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub seller_type: Option<SellerType>,

    #[serde(default)]
    pub country: Option<Country>,

    #[serde(default)]
    pub price: Bounds,

    #[serde(default)]
    pub power: Bounds,

    #[serde(default)]
    pub first_registration: Bounds,

    #[serde(default)]
    pub mileage: Bounds,

    #[serde(default)]
    pub make: Option<MakeFilter>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            seller_type: None,
            country: None,
            price: Bounds::default(),
            power: Bounds::default(),
            first_registration: Bounds::default(),
            mileage: Bounds::default(),
            make: None,
        }
    }
}

fn default_base_url() -> String {
    String::from(DEFAULT_SEARCH_URL)
}

impl SearchQuery {
    /// Renders the search URL, parameters are appended in a stable order.
    pub fn url(&self) -> String {
        let mut url = self.base_url.clone();

        if let Some(min) = self.power.min {
            push_param(&mut url, MIN_POWER_ARG, min);
            push_param(&mut url, MIN_POWER_ARG, POWER_UNIT);
        }
        if let Some(max) = self.power.max {
            push_param(&mut url, MAX_POWER_ARG, max);
            push_param(&mut url, MAX_POWER_ARG, POWER_UNIT);
        }

        push_bounds(&mut url, &self.price, MIN_PRICE_ARG, MAX_PRICE_ARG);
        push_bounds(
            &mut url,
            &self.first_registration,
            MIN_FIRST_REGISTRATION_ARG,
            MAX_FIRST_REGISTRATION_ARG,
        );
        push_bounds(&mut url, &self.mileage, MIN_MILEAGE_ARG, MAX_MILEAGE_ARG);

        if let Some(country) = self.country {
            push_param(&mut url, COUNTRY_ARG, country.as_param());
        }
        if let Some(seller_type) = self.seller_type {
            push_param(&mut url, SELLER_TYPE_ARG, seller_type.as_param());
        }
        if let Some(make) = self.make {
            push_param(&mut url, MAKE_MODEL_ARG, make);
        }

        url
    }

    pub fn with_price(&self, range: PriceRange) -> Self {
        Self {
            price: Bounds::new(Some(range.min), Some(range.max)),
            ..self.clone()
        }
    }
}

/// URL of the n-th result page of a search
pub fn page_url(search_url: &str, page: u32) -> String {
    let mut url = search_url.to_string();
    push_param(&mut url, PAGE_NUMBER_ARG, page);
    url
}

fn push_bounds(url: &mut String, bounds: &Bounds, min_arg: &str, max_arg: &str) {
    if let Some(min) = bounds.min {
        push_param(url, min_arg, min);
    }
    if let Some(max) = bounds.max {
        push_param(url, max_arg, max);
    }
}

fn push_param(url: &mut String, key: &str, value: impl Display) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(&value.to_string());
}
