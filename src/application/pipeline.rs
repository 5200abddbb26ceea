//! One refresh cycle: normalize, filter, compute margins, then alert.
//!
//! [`Pipeline::process`] is pure and deterministic; [`Pipeline::alert`] is the
//! only step that touches dedup state or the notifier. Per-record problems are
//! collected as diagnostics and never abort the cycle.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use super::normalizer::normalize;
use crate::domain::alert::AlertDeduplicator;
use crate::domain::filter::{FilterDecision, FilterRules, RejectReason};
use crate::domain::market::{MarketSnapshot, ProcessedMarket, RawMarketRecord};
use crate::domain::profit::profit_margin;
use crate::error::DeliveryError;
use crate::port::outbound::notifier::Notifier;

/// Settings that shape processed markets and alert delivery.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rules: FilterRules,
    pub trade_amount: Decimal,
    /// Base URL the market slug is appended to.
    pub trade_link_base: Url,
    /// Upper bound on a single notifier call.
    pub notify_timeout: Duration,
}

/// A snapshot kept out of the cycle by a filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub key: String,
    pub question: String,
    pub reason: RejectReason,
}

/// A raw record dropped because it could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationFailure {
    /// Best-effort identity of the offending record.
    pub record: String,
    pub kind: &'static str,
    pub message: String,
}

/// An alert that fired but could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub key: String,
    pub error: String,
}

/// Output of the pure part of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedBatch {
    /// Admitted markets in input order.
    pub markets: Vec<ProcessedMarket>,
    pub rejections: Vec<Rejection>,
    pub failures: Vec<NormalizationFailure>,
}

/// Result of the alert step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertOutcome {
    /// Keys that transitioned to notified this cycle.
    pub alerted: Vec<String>,
    /// Subset of `alerted` whose delivery failed. They stay notified.
    pub delivery_failures: Vec<DeliveryFailure>,
}

/// The filter, compute and alert stages of a cycle.
pub struct Pipeline {
    config: PipelineConfig,
    dedup: AlertDeduplicator,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        dedup: AlertDeduplicator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            dedup,
            notifier,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn dedup(&self) -> &AlertDeduplicator {
        &self.dedup
    }

    /// Normalize, filter and price a batch of raw records.
    #[must_use]
    pub fn process(&self, records: &[RawMarketRecord]) -> ProcessedBatch {
        let mut batch = ProcessedBatch::default();

        for record in records {
            let snapshot = match normalize(record) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(
                        key = %record.identity(),
                        kind = err.kind(),
                        error = %err,
                        "Dropping unparsable market record"
                    );
                    batch.failures.push(NormalizationFailure {
                        record: record.identity().to_string(),
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            match self.config.rules.evaluate(&snapshot) {
                FilterDecision::Admit => batch.markets.push(self.price(snapshot)),
                FilterDecision::Reject(reason) => {
                    debug!(key = %snapshot.key, reason = %reason, "Market rejected");
                    batch.rejections.push(Rejection {
                        key: snapshot.key,
                        question: snapshot.question,
                        reason,
                    });
                }
            }
        }

        batch
    }

    fn price(&self, snapshot: MarketSnapshot) -> ProcessedMarket {
        let profit_margin = profit_margin(&snapshot.outcome_prices);
        let trade_link = trade_link(&self.config.trade_link_base, &snapshot.key);

        ProcessedMarket {
            key: snapshot.key,
            question: snapshot.question,
            created_at: snapshot.created_at,
            prices: snapshot.outcome_prices,
            profit_margin,
            trade_amount: self.config.trade_amount,
            trade_link,
        }
    }

    /// Run admitted markets through the deduplicator and notify new crossings.
    ///
    /// The key is recorded before delivery is attempted, so a failed or slow
    /// delivery is logged and never retried.
    pub async fn alert(&mut self, markets: &[ProcessedMarket]) -> AlertOutcome {
        let mut outcome = AlertOutcome::default();

        for market in markets {
            if !self.dedup.observe(market) {
                continue;
            }

            info!(
                key = %market.key,
                margin = market.profit_margin,
                threshold = self.dedup.threshold(),
                "Margin crossed threshold"
            );
            outcome.alerted.push(market.key.clone());

            let message = format_alert(market);
            if let Err(err) = self.deliver(&message).await {
                warn!(
                    key = %market.key,
                    notifier = self.notifier.name(),
                    error = %err,
                    "Alert delivery failed"
                );
                outcome.delivery_failures.push(DeliveryFailure {
                    key: market.key.clone(),
                    error: err.to_string(),
                });
            }
        }

        outcome
    }

    async fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        let limit = self.config.notify_timeout;
        match timeout(limit, self.notifier.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout {
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

/// Link to the market page for `key`, with the slug percent-encoded.
#[must_use]
pub fn trade_link(base: &Url, key: &str) -> String {
    let mut url = base.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(key);
        }
        Err(()) => return format!("{base}{key}"),
    }
    url.to_string()
}

/// Plain-text alert body.
#[must_use]
pub fn format_alert(market: &ProcessedMarket) -> String {
    let total: f64 = market.prices.iter().sum();
    format!(
        "Arbitrage alert: {question}\n\
         Margin: {margin:.1}% (outcome prices sum to {total:.3})\n\
         Trade ${amount} -> expected profit ${profit:.2}\n\
         {link}",
        question = market.question,
        margin = market.profit_margin * 100.0,
        amount = market.trade_amount,
        profit = market.expected_profit(),
        link = market.trade_link,
    )
}
