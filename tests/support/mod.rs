#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use arbwatch::application::{Pipeline, RefreshConfig, RefreshLoop};
use arbwatch::domain::AlertDeduplicator;
use arbwatch::port::{MarketSource, Notifier};
use arbwatch::testkit::domain::pipeline_config;

pub use arbwatch::testkit::domain::{market_fields, market_record, market_with_question};
pub use arbwatch::testkit::notifier::{FailingNotifier, RecordingNotifier, StalledNotifier};
pub use arbwatch::testkit::source::ScriptedSource;

pub const THRESHOLD: f64 = 0.05;

/// Pipeline with default settings and the alert-once policy.
pub fn pipeline(notifier: Arc<dyn Notifier>) -> Pipeline {
    Pipeline::new(
        pipeline_config(),
        AlertDeduplicator::alert_once(THRESHOLD),
        notifier,
    )
}

/// Refresh loop over `source` with the given interval and fetch timeout.
pub fn refresh_loop(
    source: Arc<dyn MarketSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    fetch_timeout: Duration,
) -> RefreshLoop {
    RefreshLoop::new(
        source,
        pipeline(notifier),
        RefreshConfig {
            interval,
            fetch_timeout,
        },
    )
}
