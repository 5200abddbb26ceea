//! Market data types that flow through a refresh cycle.
//!
//! - [`RawMarketRecord`] - Untyped payload as returned by the market source
//! - [`MarketSnapshot`] - Normalized, immutable view of one market
//! - [`ProcessedMarket`] - Admitted snapshot with its computed margin

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

/// Status string that makes a market eligible.
pub const STATUS_OPEN: &str = "open";

/// Question text used when a record has none.
pub const QUESTION_PLACEHOLDER: &str = "Untitled market";

/// Untyped market record as delivered by the source.
///
/// Field names follow the Gamma API (`question`, `outcomePrices`, `slug`,
/// `status`, `createdAt`). Any field may be missing or malformed; the
/// normalizer decides what to make of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMarketRecord {
    fields: Map<String, Value>,
}

impl RawMarketRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from an arbitrary JSON value.
    ///
    /// Returns `None` when the value is not a JSON object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Field as text, if present and a string.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Field as a boolean, if present and a bool.
    #[must_use]
    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Best-effort identity for logging.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.text("slug")
            .or_else(|| self.text("conditionId"))
            .or_else(|| self.text("id"))
            .unwrap_or("<unknown>")
    }
}

impl From<Map<String, Value>> for RawMarketRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Normalized point-in-time view of a market.
///
/// Built fresh each cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    /// Market slug. May be empty, in which case it is a weak dedup key.
    pub key: String,
    pub question: String,
    /// Only the exact [`STATUS_OPEN`] is eligible.
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub outcome_prices: Vec<f64>,
}

impl MarketSnapshot {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}

/// An admitted market with its computed arbitrage margin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedMarket {
    pub key: String,
    pub question: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Validated prices: non-empty and all finite.
    pub prices: Vec<f64>,
    /// `round(max(0, 1 - sum(prices)), 3)`.
    pub profit_margin: f64,
    /// Sizing parameter carried through unchanged.
    pub trade_amount: Decimal,
    pub trade_link: String,
}

impl ProcessedMarket {
    /// Whether the quoted prices leave any margin at all.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.profit_margin > 0.0
    }

    /// Notional profit for `trade_amount` at the current margin.
    #[must_use]
    pub fn expected_profit(&self) -> Decimal {
        Decimal::try_from(self.profit_margin).unwrap_or_default() * self.trade_amount
    }
}
