//! Raw record to [`MarketSnapshot`] conversion.
//!
//! Tolerates missing fields, fails a record only on unusable prices or an
//! unparsable timestamp. Pure: no I/O, no state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::error::NormalizationError;
use crate::domain::market::{MarketSnapshot, RawMarketRecord, QUESTION_PLACEHOLDER, STATUS_OPEN};

const STATUS_CLOSED: &str = "closed";
const STATUS_INACTIVE: &str = "inactive";

/// Normalize a single raw record.
pub fn normalize(record: &RawMarketRecord) -> Result<MarketSnapshot, NormalizationError> {
    let outcome_prices = parse_prices(record.get("outcomePrices"))?;
    let created_at = parse_created_at(record.get("createdAt"))?;

    Ok(MarketSnapshot {
        key: record.text("slug").map(str::trim).unwrap_or_default().to_string(),
        question: question(record),
        status: status(record),
        created_at,
        outcome_prices,
    })
}

fn question(record: &RawMarketRecord) -> String {
    record
        .text("question")
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(QUESTION_PLACEHOLDER)
        .to_string()
}

/// Explicit `status` wins verbatim; otherwise derive from the Gamma
/// `closed`/`active` flags, defaulting to open.
fn status(record: &RawMarketRecord) -> String {
    if let Some(status) = record.text("status").filter(|s| !s.is_empty()) {
        return status.to_string();
    }
    if record.flag("closed") == Some(true) {
        return STATUS_CLOSED.to_string();
    }
    if record.flag("active") == Some(false) {
        return STATUS_INACTIVE.to_string();
    }
    STATUS_OPEN.to_string()
}

/// Accepts a JSON array of numbers or numeric strings, or text encoding one
/// (`"[0.4, 0.6]"`, `"[\"0.4\", \"0.6\"]"`). Missing means no prices.
fn parse_prices(value: Option<&Value>) -> Result<Vec<f64>, NormalizationError> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(price_from_value).collect(),
        Some(Value::String(text)) => parse_price_text(text),
        Some(other) => Err(unparsable(format!(
            "expected a sequence, got {}",
            value_kind(other)
        ))),
    }
}

fn parse_price_text(text: &str) -> Result<Vec<f64>, NormalizationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(items) = serde_json::from_str::<Vec<Value>>(text) {
        return items.iter().map(price_from_value).collect();
    }

    // Python-style lists with single quotes are not valid JSON.
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| unparsable(format!("not a list: {text}")))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|item| price_from_str(item.trim().trim_matches(|c| c == '\'' || c == '"')))
        .collect()
}

fn price_from_value(value: &Value) -> Result<f64, NormalizationError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| unparsable(format!("number out of range: {n}")))
            .and_then(finite),
        Value::String(s) => price_from_str(s.trim()),
        other => Err(unparsable(format!(
            "expected a number, got {}",
            value_kind(other)
        ))),
    }
}

fn price_from_str(raw: &str) -> Result<f64, NormalizationError> {
    raw.parse::<f64>()
        .map_err(|_| unparsable(format!("not a number: {raw:?}")))
        .and_then(finite)
}

fn finite(price: f64) -> Result<f64, NormalizationError> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(unparsable(format!("non-finite price: {price}")))
    }
}

fn parse_created_at(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, NormalizationError> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_timestamp(s.trim())
            .map(Some)
            .ok_or_else(|| NormalizationError::BadTimestamp { value: s.clone() }),
        Some(other) => Err(NormalizationError::BadTimestamp {
            value: other.to_string(),
        }),
    }
}

/// RFC 3339 first (covers the `Z` suffix), then the looser forms the Gamma
/// API has been seen to emit. Offset-less values are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn unparsable(reason: String) -> NormalizationError {
    NormalizationError::UnparsablePrices { reason }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
