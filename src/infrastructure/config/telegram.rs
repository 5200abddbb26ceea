//! Telegram notification configuration.
//!
//! The bot token and chat ID come from the environment
//! (`TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`), never from the config file.

use serde::Deserialize;

/// Telegram notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Upper bound on a single send, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    5000
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}
