use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::config::{CrawlerConfig, Throttle};

/// Downloads a page as text
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    send_referer: bool,
    pacer: Pacer,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name {name:?}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {name}"))?;
            headers.insert(name, value);
        }

        let client = reqwest::ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            send_referer: config.send_referer,
            pacer: Pacer::new(config.throttle)?,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pacer.ready().await;

        let mut req = self.client.get(url);
        if self.send_referer {
            req = req.header(REFERER, url);
        }
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}

/// Spaces out request starts according to the throttle
struct Pacer {
    period: Option<Duration>,
    next: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(throttle: Option<Throttle>) -> Result<Self> {
        let period = match throttle {
            Some(Throttle::PerSecond(n)) => Some(Duration::from_secs_f64(1.0 / n.get() as f64)),
            Some(Throttle::Delay(secs)) if secs <= 0.0 => None,
            Some(Throttle::Delay(secs)) => Some(
                Duration::try_from_secs_f32(secs)
                    .with_context(|| format!("Invalid throttle delay {secs}"))?,
            ),
            Some(Throttle::Concurrent(_)) | None => None,
        };
        Ok(Self {
            period,
            next: Mutex::new(None),
        })
    }

    async fn ready(&self) {
        let Some(period) = self.period else {
            return;
        };
        let mut next = self.next.lock().await;
        let now = Instant::now();
        let start = next.map_or(now, |at| at.max(now));
        sleep_until(start).await;
        *next = Some(start + period);
    }
}
