pub mod catalog;
mod listing;
mod partition;
mod query;

pub use catalog::{find_brand, make_filter, Brand, MakeFilter, Model, ModelCode, ModelKind, Variant};
pub use listing::{ad_id, clean_text, unique_ads, SearchPage};
pub use partition::{price_slices, PartitionConfig, PriceRange};
pub use query::{page_url, Bounds, Country, SearchQuery, SellerType, DEFAULT_SEARCH_URL};
