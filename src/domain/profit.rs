//! Arbitrage margin calculation.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept in a reported margin.
pub const MARGIN_DECIMALS: u32 = 3;

/// Compute the riskless margin of buying every outcome once.
///
/// Returns `round(max(0, 1 - sum(prices)), 3)`, never negative.
///
/// # Preconditions
///
/// `prices` must be non-empty and every element finite. An empty slice sums
/// to zero and would report a margin of `1.0`, a false maximal-profit signal;
/// the filter pipeline rejects such markets before they get here. This
/// function does not re-check eligibility.
#[must_use]
pub fn profit_margin(prices: &[f64]) -> f64 {
    let total: f64 = prices.iter().sum();
    round_margin((1.0 - total).max(0.0))
}

/// Round half-to-even at [`MARGIN_DECIMALS`] on the exact binary value.
fn round_margin(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .or_else(|| Decimal::from_f64(value))
        .map(|d| d.round_dp_with_strategy(MARGIN_DECIMALS, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}
