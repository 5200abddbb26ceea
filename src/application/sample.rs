//! Built-in markets used when the source returns nothing.

use serde_json::json;

use crate::domain::market::RawMarketRecord;

/// Small fixed dataset that goes through the full pipeline like live data.
#[must_use]
pub fn sample_markets() -> Vec<RawMarketRecord> {
    [
        json!({
            "question": "Bitcoin price above $40k by March",
            "outcomePrices": [0.42, 0.32, 0.19],
            "slug": "btc-march"
        }),
        json!({
            "question": "Election winner candidate A",
            "outcomePrices": [0.45, 0.30, 0.20],
            "slug": "election"
        }),
        json!({
            "question": "Ethereum above $2k by April",
            "outcomePrices": [0.48, 0.33, 0.18],
            "slug": "eth-april"
        }),
    ]
    .into_iter()
    .filter_map(RawMarketRecord::from_value)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::normalizer::normalize;
    use crate::domain::profit::profit_margin;

    #[test]
    fn sample_markets_normalize_cleanly() {
        let markets = sample_markets();
        assert_eq!(markets.len(), 3);

        let margins: Vec<f64> = markets
            .iter()
            .map(|m| profit_margin(&normalize(m).unwrap().outcome_prices))
            .collect();
        assert_eq!(margins, [0.07, 0.05, 0.01]);
    }
}
