//! Per-record normalization errors.
//!
//! A record that fails normalization is dropped from the cycle; the rest of
//! the batch continues.

use thiserror::Error;

/// Why a raw market record could not become a [`MarketSnapshot`].
///
/// [`MarketSnapshot`]: super::market::MarketSnapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    /// `outcomePrices` is not a sequence, or an element is not a finite number.
    #[error("unparsable outcome prices: {reason}")]
    UnparsablePrices {
        /// What went wrong while parsing.
        reason: String,
    },

    /// `createdAt` is present but is not an ISO-8601 timestamp.
    #[error("bad createdAt timestamp: {value}")]
    BadTimestamp {
        /// The offending raw value.
        value: String,
    },
}

impl NormalizationError {
    /// Stable short name used in logs and diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnparsablePrices { .. } => "unparsable_prices",
            Self::BadTimestamp { .. } => "bad_timestamp",
        }
    }
}
