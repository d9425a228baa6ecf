use std::cmp;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use cas_search::PartitionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request, on top of the user agent
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// Send the requested URL as `referer`
    #[serde(default = "default_send_referer")]
    pub send_referer: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_page_buffer")]
    pub page_buffer: usize,

    #[serde(default = "default_throttle")]
    pub throttle: Option<Throttle>,

    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    #[serde(default = "default_on_dl_error")]
    pub on_dl_error: OnError,

    #[serde(default = "default_on_scrap_error")]
    pub on_scrap_error: OnError,

    #[serde(default = "default_handle_sigint")]
    pub handle_sigint: bool,

    #[serde(default)]
    pub partition: PartitionConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            headers: default_headers(),
            send_referer: default_send_referer(),
            timeout_secs: default_timeout_secs(),
            page_buffer: default_page_buffer(),
            throttle: default_throttle(),
            num_workers: default_num_workers(),
            on_dl_error: default_on_dl_error(),
            on_scrap_error: default_on_scrap_error(),
            handle_sigint: default_handle_sigint(),
            partition: PartitionConfig::default(),
        }
    }
}

impl CrawlerConfig {
    /// Maximum number of requests in flight
    pub fn concurrency(&self) -> usize {
        match self.throttle {
            Some(Throttle::Concurrent(n)) | Some(Throttle::PerSecond(n)) => n.get(),
            Some(Throttle::Delay(_)) | None => 1,
        }
    }
}

fn default_user_agent() -> String {
    String::from("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/84.0.4147.135 Safari/537.36")
}

fn default_headers() -> BTreeMap<String, String> {
    [
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9"),
        ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
        ("cache-control", "max-age=0"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
        ("sec-fetch-user", "?1"),
        ("upgrade-insecure-requests", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_send_referer() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_buffer() -> usize {
    1_000
}

fn default_throttle() -> Option<Throttle> {
    None
}

fn default_num_workers() -> usize {
    cmp::max(1, num_cpus::get().saturating_sub(2))
}

fn default_on_dl_error() -> OnError {
    OnError::SkipAndLog
}

fn default_on_scrap_error() -> OnError {
    OnError::SkipAndLog
}

fn default_handle_sigint() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OnError {
    Fail,
    SkipAndLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Throttle {
    /// The maximum number of concurrent requests
    Concurrent(NonZeroUsize),
    /// The number of requests per second
    PerSecond(NonZeroUsize),
    /// The delay in seconds between requests
    Delay(f32),
}
