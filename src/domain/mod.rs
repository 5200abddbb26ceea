//! Exchange-agnostic domain types and pure functions.
//!
//! - [`market`] - Raw records, normalized snapshots and processed markets
//! - [`filter`] - Eligibility rules and rejection reasons
//! - [`profit`] - Arbitrage margin calculation
//! - [`alert`] - Session-scoped alert deduplication
//! - [`error`] - Per-record normalization errors

pub mod alert;
pub mod error;
pub mod filter;
pub mod market;
pub mod profit;

pub use alert::{
    AlertDeduplicator, AlertOnce, AlertState, DedupPolicy, DedupPolicyKind, RearmBelowThreshold,
};
pub use error::NormalizationError;
pub use filter::{FilterDecision, FilterRules, RejectReason};
pub use market::{MarketSnapshot, ProcessedMarket, RawMarketRecord};
pub use profit::profit_margin;
