//! Scanner tuning: sizing, alert threshold, cadence and filter rules.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::alert::DedupPolicyKind;

/// Scanner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Trade size shown with each market and used for expected profit.
    #[serde(default = "default_trade_amount")]
    pub trade_amount: Decimal,
    /// Minimum profit margin (0.05 = 5%) that triggers an alert.
    #[serde(default = "default_min_profit_threshold")]
    pub min_profit_threshold: f64,
    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Markets created before this year are rejected.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Case-insensitive question substrings that mark known-bad markets.
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
    /// Whether a market may alert again after dipping below the threshold.
    #[serde(default)]
    pub dedup_policy: DedupPolicyKind,
}

fn default_trade_amount() -> Decimal {
    dec!(50)
}

const fn default_min_profit_threshold() -> f64 {
    0.05
}

const fn default_refresh_interval_secs() -> u64 {
    10
}

const fn default_min_year() -> i32 {
    2025
}

fn default_blacklist() -> Vec<String> {
    vec!["test-market".to_string()]
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            trade_amount: default_trade_amount(),
            min_profit_threshold: default_min_profit_threshold(),
            refresh_interval_secs: default_refresh_interval_secs(),
            min_year: default_min_year(),
            blacklist: default_blacklist(),
            dedup_policy: DedupPolicyKind::default(),
        }
    }
}
