//! HTTP fetching with retries, backoff, and a fixed inter-request delay.
//!
//! Uses wreq for TLS fingerprint emulation so storefront bot-walls see a
//! regular browser handshake.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A fetch that exhausted its retry budget. Returned (not thrown past the
/// orchestrator) so one dead URL downgrades to a per-product skip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("giving up on {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Option<wreq::Error>,
    },
}

/// Result of a successful round trip.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response body.
    Page(String),
    /// Non-retryable non-2xx status: the page doesn't exist, skip
    /// extraction for this URL.
    Missing { status: u16 },
}

/// Trait for page fetching - enables mocking for tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches one URL, retrying transient failures internally.
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError>;
}

/// Sequential HTTP client with browser impersonation. Every request is
/// preceded by the configured delay (plus optional jitter); transport
/// errors and 5xx responses are retried with doubling backoff.
pub struct HttpClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
    retries: u32,
    backoff_ms: u64,
}

impl HttpClient {
    /// Creates a new client from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            retries: config.retries.max(1),
            backoff_ms: config.backoff_ms,
        })
    }

    /// Sends one GET. Ok(Ok(body)) on 2xx, Ok(Err(status)) on non-2xx,
    /// Err on transport failure.
    async fn try_get(&self, url: &str) -> Result<Result<String, u16>, wreq::Error> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Ok(Err(status.as_u16()));
        }

        Ok(Ok(response.text().await?))
    }

    /// Pauses between requests to keep a fixed crawl pace.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        self.delay().await;

        let mut last_error = None;

        for attempt in 1..=self.retries {
            match self.try_get(url).await {
                Ok(Ok(body)) => return Ok(FetchOutcome::Page(body)),
                Ok(Err(status)) if (500..600).contains(&status) => {
                    warn!("Attempt {}/{}: {} returned {}", attempt, self.retries, url, status);
                }
                Ok(Err(status)) => {
                    debug!("{} returned {}, treating as missing", url, status);
                    return Ok(FetchOutcome::Missing { status });
                }
                Err(e) => {
                    warn!("Attempt {}/{}: {} failed: {}", attempt, self.retries, url, e);
                    last_error = Some(e);
                }
            }

            if attempt < self.retries {
                let backoff = self.backoff_ms << (attempt - 1);
                debug!("Backing off {}ms", backoff);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.retries,
            source: last_error,
        })
    }
}
