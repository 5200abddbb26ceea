//! Handler for `check config`.

use std::path::Path;

use serde_json::json;

use super::{config, output};
use crate::error::Result;

/// Validate the configuration file and print the effective values.
pub fn execute_config(config_path: &Path) -> Result<()> {
    let config = config::load_strict(config_path)?;

    output::section("Configuration Check");
    output::field("Config", config_path.display());
    output::success("Configuration file is valid");

    output::section("Scanner");
    output::field("Trade amount", format!("${}", config.scanner.trade_amount));
    output::field(
        "Threshold",
        format!("{:.1}%", config.scanner.min_profit_threshold * 100.0),
    );
    output::field(
        "Interval",
        format!("{}s", config.scanner.refresh_interval_secs),
    );
    output::field("Min year", config.scanner.min_year);
    output::field(
        "Blacklist",
        json!(config.filter_rules().blacklist()).to_string(),
    );
    output::field("Dedup policy", config.scanner.dedup_policy.as_str());

    output::section("Source");
    output::field("Gamma URL", &config.source.gamma_url);
    output::field("Trade links", &config.source.trade_link_base);
    output::field("Limit", config.source.limit);
    output::field("Timeout", format!("{}ms", config.source.timeout_ms));
    output::field(
        "Retries",
        format!(
            "{} attempts, {}ms backoff",
            config.source.retry_max_attempts, config.source.retry_backoff_ms
        ),
    );

    output::section("Notifications");
    if config.telegram.enabled {
        let token_present = env_present("TELEGRAM_BOT_TOKEN");
        let chat_present = env_present("TELEGRAM_CHAT_ID");
        if token_present && chat_present {
            output::success("Telegram integration configured");
        } else {
            output::warning("Telegram enabled but environment variables are missing");
            if !token_present {
                output::field("Missing", "TELEGRAM_BOT_TOKEN");
            }
            if !chat_present {
                output::field("Missing", "TELEGRAM_CHAT_ID");
            }
        }
        if !cfg!(feature = "telegram") {
            output::warning("this binary was built without the telegram feature");
        }
    } else {
        output::field("Telegram", "disabled");
    }
    output::field("Log level", &config.logging.level);
    output::field("Log format", &config.logging.format);

    output::success("Configuration check complete");
    Ok(())
}

fn env_present(key: &str) -> bool {
    std::env::var(key).is_ok_and(|value| !value.trim().is_empty())
}
