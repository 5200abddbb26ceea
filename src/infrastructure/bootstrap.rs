//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::polymarket::GammaClient;
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{TelegramConfig, TelegramNotifier};
use crate::application::pipeline::Pipeline;
use crate::application::refresh::RefreshLoop;
use crate::domain::alert::AlertDeduplicator;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::notifier::{LogNotifier, Notifier, NotifierRegistry};
use crate::port::outbound::source::MarketSource;

/// Build the live market source.
pub fn build_source(config: &Config) -> Arc<dyn MarketSource> {
    Arc::new(GammaClient::from_config(&config.source))
}

/// Build notifier registry from configuration.
///
/// Alerts always go to the log. Telegram is added when enabled in the config
/// and both credentials are present in the environment.
#[cfg(feature = "telegram")]
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    registry
}

/// Build notifier registry from configuration (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    if config.telegram.enabled {
        warn!("Telegram enabled in config but the binary was built without the telegram feature");
    }
    registry
}

/// Build the pipeline with the configured dedup policy.
///
/// # Errors
///
/// Returns an error if the pipeline settings are invalid.
pub fn build_pipeline(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Pipeline> {
    let dedup = AlertDeduplicator::new(
        config.scanner.min_profit_threshold,
        config.scanner.dedup_policy.build(),
    );
    Ok(Pipeline::new(config.pipeline_config()?, dedup, notifier))
}

/// Wire the live source, notifiers and pipeline into a refresh loop.
///
/// # Errors
///
/// Returns an error if the pipeline settings are invalid.
pub fn build_refresh_loop(config: &Config) -> Result<RefreshLoop> {
    let registry = build_notifier_registry(config);
    info!(notifiers = ?registry.names(), "Notifiers registered");
    let pipeline = build_pipeline(config, Arc::new(registry))?;
    Ok(RefreshLoop::new(
        build_source(config),
        pipeline,
        config.refresh_config(),
    ))
}
