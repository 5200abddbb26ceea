//! Polymarket Gamma source configuration.

use serde::Deserialize;

/// Gamma API connection and paging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GammaConfig {
    /// Gamma API base URL.
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    /// Base URL the market slug is appended to for trade links.
    #[serde(default = "default_trade_link_base")]
    pub trade_link_base: String,
    /// Maximum markets requested per cycle.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum number of attempts for transient failures.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".into()
}

fn default_trade_link_base() -> String {
    "https://polymarket.com/event/".into()
}

const fn default_limit() -> usize {
    100
}

const fn default_timeout_ms() -> u64 {
    5000
}

const fn default_connect_timeout_ms() -> u64 {
    2000
}

const fn default_retry_max_attempts() -> u32 {
    2
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            trade_link_base: default_trade_link_base(),
            limit: default_limit(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}
