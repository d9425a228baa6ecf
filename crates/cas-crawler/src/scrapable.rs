use std::fmt;
use std::path::PathBuf;

use cas_search::SearchQuery;

pub trait Scrapable {
    type Config: Clone + Send + 'static;

    fn new(config: &Self::Config) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn scrap(&mut self, page: String, location: &PageLocation) -> anyhow::Result<()>;

    fn finalizer(&mut self) {}
}

/// Where the crawl starts from
#[derive(Debug, Clone)]
pub enum Seed {
    /// A query to plan, the result cap is worked around by partitioning
    Query(SearchQuery),
    /// Search URLs to paginate as they are
    Searches(Vec<String>),
    /// Ad URLs to scrap directly
    Ads(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLocation {
    Url(String),
    Path(PathBuf),
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
