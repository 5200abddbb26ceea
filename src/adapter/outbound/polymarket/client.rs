//! Polymarket Gamma API client.
//!
//! Fetches `GET /markets?active=true&closed=false&limit=N` from
//! `gamma-api.polymarket.com`, a flat JSON array of market objects. Records
//! are passed through untyped; the normalizer owns field interpretation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::settings::GammaConfig;
use crate::domain::market::RawMarketRecord;
use crate::error::FetchError;
use crate::port::outbound::source::MarketSource;

/// HTTP client for the Gamma market listing.
pub struct GammaClient {
    http: HttpClient,
    gamma_url: String,
    limit: usize,
    timeout_ms: u64,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl GammaClient {
    /// Create a client with default settings and no retries.
    #[must_use]
    pub fn new(gamma_url: String) -> Self {
        Self::from_config(&GammaConfig {
            gamma_url,
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
            ..GammaConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &GammaConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            gamma_url: config.gamma_url.trim_end_matches('/').to_string(),
            limit: config.limit,
            timeout_ms: config.timeout_ms,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// URL of the active market listing.
    #[must_use]
    pub fn markets_url(&self) -> String {
        format!(
            "{}/markets?active=true&closed=false&limit={}",
            self.gamma_url, self.limit
        )
    }

    async fn get_with_retry(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(self.fetch_error(err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = response.error_for_status()?;

            match response.json::<Vec<Value>>().await {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(self.fetch_error(err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    /// Request timeouts carry the configured limit; everything else maps
    /// by status or kind.
    fn fetch_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return FetchError::Timeout {
                after_ms: self.timeout_ms,
            };
        }
        err.into()
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

/// Keep JSON objects, count and drop anything else in the array.
fn into_records(values: Vec<Value>) -> Vec<RawMarketRecord> {
    let total = values.len();
    let records: Vec<_> = values
        .into_iter()
        .filter_map(RawMarketRecord::from_value)
        .collect();

    if records.len() < total {
        warn!(
            dropped = total - records.len(),
            "Ignoring non-object entries in Gamma response"
        );
    }
    records
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch(&self) -> Result<Vec<RawMarketRecord>, FetchError> {
        let url = self.markets_url();
        info!(url = %url, "Fetching active markets (Gamma)");

        let values = self.get_with_retry(&url).await?;
        let records = into_records(values);
        debug!(count = records.len(), "Fetched markets from Gamma");

        Ok(records)
    }

    fn source_name(&self) -> &'static str {
        "gamma"
    }
}
