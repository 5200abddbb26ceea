//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; every section has
//! defaults, so an empty file is valid. A handful of scanner knobs can be
//! overridden from the environment.
//!
//! # Example
//!
//! ```no_run
//! use arbwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("arbwatch.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::scanner::ScannerConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::polymarket::settings::GammaConfig;
use crate::application::pipeline::PipelineConfig;
use crate::application::refresh::RefreshConfig;
use crate::domain::filter::FilterRules;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `scanner.min_year`.
pub const ENV_MIN_YEAR: &str = "ARBWATCH_MIN_YEAR";
/// Environment variable overriding `scanner.min_profit_threshold`.
pub const ENV_THRESHOLD: &str = "ARBWATCH_THRESHOLD";
/// Environment variable overriding `scanner.trade_amount`.
pub const ENV_TRADE_AMOUNT: &str = "ARBWATCH_TRADE_AMOUNT";
/// Environment variable overriding `scanner.refresh_interval_secs`.
pub const ENV_INTERVAL_SECS: &str = "ARBWATCH_INTERVAL_SECS";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Sizing, threshold, cadence and filter rules.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Market source (Gamma API) settings.
    #[serde(default)]
    pub source: GammaConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than the file not existing.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::ReadFile(err).into()),
        }
    }

    /// Apply `ARBWATCH_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an override does not parse or fails validation.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an override does not parse or fails validation.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(year) = parse_override::<i32, _>(&lookup, ENV_MIN_YEAR, "min_year")? {
            self.scanner.min_year = year;
        }
        if let Some(threshold) =
            parse_override::<f64, _>(&lookup, ENV_THRESHOLD, "min_profit_threshold")?
        {
            self.scanner.min_profit_threshold = threshold;
        }
        if let Some(amount) =
            parse_override::<Decimal, _>(&lookup, ENV_TRADE_AMOUNT, "trade_amount")?
        {
            self.scanner.trade_amount = amount;
        }
        if let Some(secs) =
            parse_override::<u64, _>(&lookup, ENV_INTERVAL_SECS, "refresh_interval_secs")?
        {
            self.scanner.refresh_interval_secs = secs;
        }
        self.validate()
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range or missing value.
    pub fn validate(&self) -> Result<()> {
        let scanner = &self.scanner;
        if scanner.trade_amount <= Decimal::ZERO {
            return Err(invalid("trade_amount", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&scanner.min_profit_threshold) {
            return Err(invalid("min_profit_threshold", "must be between 0 and 1"));
        }
        if scanner.refresh_interval_secs == 0 {
            return Err(invalid("refresh_interval_secs", "must be greater than 0"));
        }
        if !(1970..=9999).contains(&scanner.min_year) {
            return Err(invalid("min_year", "must be a four-digit year"));
        }

        let source = &self.source;
        if source.gamma_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "gamma_url" }.into());
        }
        parse_http_url("gamma_url", &source.gamma_url)?;
        parse_http_url("trade_link_base", &source.trade_link_base)?;
        if source.limit == 0 {
            return Err(invalid("limit", "must be greater than 0"));
        }
        if source.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be greater than 0"));
        }
        if self.telegram.timeout_ms == 0 {
            return Err(invalid("telegram.timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }

    /// Filter rules built from the scanner section.
    #[must_use]
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules::new(&self.scanner.blacklist, self.scanner.min_year)
    }

    /// Pipeline settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `trade_link_base` is not a valid URL.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        Ok(PipelineConfig {
            rules: self.filter_rules(),
            trade_amount: self.scanner.trade_amount,
            trade_link_base: parse_http_url("trade_link_base", &self.source.trade_link_base)?,
            notify_timeout: Duration::from_millis(self.telegram.timeout_ms),
        })
    }

    /// Refresh loop timing. The fetch timeout leaves headroom for retries.
    #[must_use]
    pub fn refresh_config(&self) -> RefreshConfig {
        let attempts = u64::from(self.source.retry_max_attempts.max(1));
        let per_attempt = self.source.timeout_ms + self.source.retry_backoff_ms;
        RefreshConfig {
            interval: Duration::from_secs(self.scanner.refresh_interval_secs),
            fetch_timeout: Duration::from_millis(per_attempt.saturating_mul(attempts)),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(field, &e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, "must be an http(s) URL"));
    }
    Ok(url)
}

fn parse_override<T, F>(lookup: &F, key: &str, field: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| invalid(field, &format!("{key}={raw}: {e}")))
}
