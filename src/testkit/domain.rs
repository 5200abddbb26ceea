//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`RawMarketRecord`] and
//! [`PipelineConfig`] so tests focus on assertions rather than
//! construction boilerplate.

use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::{json, Map, Value};
use url::Url;

use crate::application::pipeline::PipelineConfig;
use crate::domain::filter::FilterRules;
use crate::domain::market::RawMarketRecord;

/// Trade link base used by [`pipeline_config`].
pub const TRADE_LINK_BASE: &str = "https://polymarket.com/event/";

/// Fields of an open 2025 market with the given slug and prices.
///
/// The question is derived from the slug so blacklist tests can target it.
pub fn market_fields(slug: &str, prices: Value) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("slug".into(), json!(slug));
    fields.insert("question".into(), json!(format!("Will {slug} resolve?")));
    fields.insert("status".into(), json!("open"));
    fields.insert("createdAt".into(), json!("2025-03-01T12:00:00Z"));
    fields.insert("outcomePrices".into(), prices);
    fields
}

/// An open 2025 market record with the given slug and prices.
pub fn market_record(slug: &str, prices: Value) -> RawMarketRecord {
    RawMarketRecord::new(market_fields(slug, prices))
}

/// Like [`market_record`] but with an explicit question.
pub fn market_with_question(slug: &str, question: &str, prices: Value) -> RawMarketRecord {
    let mut fields = market_fields(slug, prices);
    fields.insert("question".into(), json!(question));
    RawMarketRecord::new(fields)
}

/// Pipeline settings matching the shipped defaults, with a short notify timeout.
pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        rules: FilterRules::new(["test-market"], 2025),
        trade_amount: dec!(50),
        trade_link_base: Url::parse(TRADE_LINK_BASE).expect("valid trade link base"),
        notify_timeout: Duration::from_secs(1),
    }
}
