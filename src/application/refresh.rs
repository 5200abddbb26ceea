//! Refresh loop driving the pipeline on a fixed interval.
//!
//! Cycles run inline on the loop task, so two cycles never overlap. Ticks
//! that fall due while a cycle is still running are dropped: the next cycle
//! starts on the first interval boundary after the slow one finishes, and
//! each overrun is logged and counted. A shutdown signal interrupts the wait
//! between cycles, never a cycle in flight.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::pipeline::{AlertOutcome, Pipeline, ProcessedBatch};
use super::sample::sample_markets;
use crate::domain::market::RawMarketRecord;
use crate::error::FetchError;
use crate::port::outbound::source::MarketSource;

/// Timing for the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub interval: Duration,
    /// Upper bound on a single source fetch.
    pub fetch_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// Everything one cycle produced, for display and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number within the session.
    pub cycle: u64,
    /// Records handed to the pipeline, live or fallback.
    pub fetched: usize,
    pub used_fallback: bool,
    pub fetch_error: Option<String>,
    #[serde(flatten)]
    pub batch: ProcessedBatch,
    #[serde(flatten)]
    pub alerts: AlertOutcome,
    pub duration_ms: u64,
    /// Ticks dropped so far this session because a cycle overran.
    pub skipped_ticks: u64,
}

/// Owns the pipeline and its alert state for the lifetime of a session.
pub struct RefreshLoop {
    source: Arc<dyn MarketSource>,
    pipeline: Pipeline,
    config: RefreshConfig,
    cycle: u64,
    skipped_ticks: u64,
    reports: watch::Sender<Option<Arc<CycleReport>>>,
}

impl RefreshLoop {
    #[must_use]
    pub fn new(source: Arc<dyn MarketSource>, pipeline: Pipeline, config: RefreshConfig) -> Self {
        let (reports, _) = watch::channel(None);
        Self {
            source,
            pipeline,
            config,
            cycle: 0,
            skipped_ticks: 0,
            reports,
        }
    }

    /// Receiver that sees the latest [`CycleReport`] after every cycle.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CycleReport>>> {
        self.reports.subscribe()
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run cycles until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }

        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            source = self.source.source_name(),
            interval_secs = self.config.interval.as_secs_f64(),
            policy = self.pipeline.dedup().policy().name(),
            threshold = self.pipeline.dedup().threshold(),
            "Refresh loop started"
        );

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(cycles = self.cycle, "Refresh loop stopping");
                        break;
                    }
                }
                scheduled = ticker.tick() => {
                    self.run_cycle().await;
                    let missed = self.missed_ticks(scheduled.elapsed());
                    if missed > 0 {
                        self.skipped_ticks += u64::from(missed);
                        let next = self.config.interval.saturating_mul(missed.saturating_add(1));
                        ticker.reset_at(scheduled + next);
                        warn!(
                            cycle = self.cycle,
                            elapsed_ms = duration_ms(scheduled.elapsed()),
                            interval_ms = duration_ms(self.config.interval),
                            skipped = missed,
                            "Cycle overran refresh interval, dropping missed ticks"
                        );
                    }
                }
            }
        }
    }

    /// Interval boundaries strictly inside `elapsed`. A cycle that ends
    /// exactly on a boundary misses nothing.
    fn missed_ticks(&self, elapsed: Duration) -> u32 {
        let period = self.config.interval.as_nanos().max(1);
        let missed = elapsed.as_nanos().saturating_sub(1) / period;
        u32::try_from(missed).unwrap_or(u32::MAX)
    }

    /// Run one full cycle: fetch (or fall back), process, alert, publish.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        self.cycle += 1;

        let (records, fetch_error, used_fallback) = match self.fetch().await {
            Ok(records) if !records.is_empty() => (records, None, false),
            Ok(_) => {
                warn!(
                    cycle = self.cycle,
                    source = self.source.source_name(),
                    "Source returned no markets, using sample data"
                );
                (sample_markets(), None, true)
            }
            Err(err) => {
                warn!(
                    cycle = self.cycle,
                    source = self.source.source_name(),
                    error = %err,
                    "Market fetch failed, using sample data"
                );
                (sample_markets(), Some(err.to_string()), true)
            }
        };

        let batch = self.pipeline.process(&records);
        let alerts = self.pipeline.alert(&batch.markets).await;

        let report = CycleReport {
            cycle: self.cycle,
            fetched: records.len(),
            used_fallback,
            fetch_error,
            batch,
            alerts,
            duration_ms: duration_ms(started.elapsed()),
            skipped_ticks: self.skipped_ticks,
        };

        info!(
            cycle = report.cycle,
            fetched = report.fetched,
            admitted = report.batch.markets.len(),
            rejected = report.batch.rejections.len(),
            failed = report.batch.failures.len(),
            alerts = report.alerts.alerted.len(),
            delivery_failures = report.alerts.delivery_failures.len(),
            fallback = report.used_fallback,
            "Cycle complete"
        );

        self.reports.send_replace(Some(Arc::new(report.clone())));
        report
    }

    async fn fetch(&self) -> Result<Vec<RawMarketRecord>, FetchError> {
        let limit = self.config.fetch_timeout;
        match time::timeout(limit, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after_ms: duration_ms(limit),
            }),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::AlertDeduplicator;
    use crate::port::outbound::notifier::NullNotifier;
    use crate::testkit::domain::pipeline_config;
    use crate::testkit::source::ScriptedSource;

    fn assert_send<T: Send>(_: T) {}

    fn refresh_loop(interval: Duration) -> RefreshLoop {
        let pipeline = Pipeline::new(
            pipeline_config(),
            AlertDeduplicator::alert_once(0.05),
            Arc::new(NullNotifier),
        );
        RefreshLoop::new(
            Arc::new(ScriptedSource::always(Vec::new())),
            pipeline,
            RefreshConfig {
                interval,
                fetch_timeout: Duration::from_secs(1),
            },
        )
    }

    #[test]
    fn run_future_can_be_spawned() {
        let (_tx, rx) = watch::channel(false);
        assert_send(refresh_loop(Duration::from_secs(10)).run(rx));
    }

    #[test]
    fn missed_ticks_counts_boundaries_inside_the_cycle() {
        let refresh = refresh_loop(Duration::from_secs(10));
        assert_eq!(refresh.missed_ticks(Duration::from_secs(3)), 0);
        assert_eq!(refresh.missed_ticks(Duration::from_secs(10)), 0);
        assert_eq!(refresh.missed_ticks(Duration::from_secs(15)), 1);
        assert_eq!(refresh.missed_ticks(Duration::from_secs(25)), 2);
        assert_eq!(refresh.missed_ticks(Duration::from_secs(30)), 2);
    }
}
