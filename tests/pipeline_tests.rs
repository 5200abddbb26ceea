mod support;

use std::sync::Arc;

use arbwatch::domain::{AlertDeduplicator, DedupPolicyKind, RejectReason};
use arbwatch::application::Pipeline;
use arbwatch::testkit::domain::pipeline_config;
use serde_json::json;
use support::{market_fields, market_record, market_with_question, pipeline, RecordingNotifier};

fn margin_of(prices: serde_json::Value) -> f64 {
    let batch = pipeline(Arc::new(RecordingNotifier::new())).process(&[market_record("m", prices)]);
    assert_eq!(batch.markets.len(), 1, "market should be admitted");
    batch.markets[0].profit_margin
}

#[test]
fn scenario_a_margin_is_seven_cents() {
    assert_eq!(margin_of(json!([0.42, 0.32, 0.19])), 0.07);
}

#[test]
fn scenario_b_overpriced_market_clamps_to_zero() {
    assert_eq!(margin_of(json!([0.5, 0.5, 0.2])), 0.0);
}

#[test]
fn scenario_c_encoded_text_matches_native_sequence() {
    let encoded = margin_of(json!("[0.3, 0.3, 0.3]"));
    let native = margin_of(json!([0.3, 0.3, 0.3]));
    assert_eq!(encoded, native);
    assert_eq!(encoded, 0.1);
}

#[test]
fn scenario_d_age_cutoff() {
    let mut old = market_fields("cutoff", json!([0.4, 0.5]));
    old.insert("createdAt".into(), json!("2022-06-01T00:00:00Z"));
    let mut recent = old.clone();
    recent.insert("createdAt".into(), json!("2025-06-01T00:00:00Z"));

    let pipeline = pipeline(Arc::new(RecordingNotifier::new()));
    let batch = pipeline.process(&[old.into(), recent.into()]);

    assert_eq!(batch.rejections.len(), 1);
    assert_eq!(batch.rejections[0].reason, RejectReason::TooOld);
    assert_eq!(batch.markets.len(), 1);
    assert_eq!(batch.markets[0].key, "cutoff");
}

#[tokio::test]
async fn scenario_e_no_realert_after_dip() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));

    let mut alerted = Vec::new();
    for prices in [
        json!([0.42, 0.32, 0.19]),
        json!([0.49, 0.49]),
        json!([0.42, 0.32, 0.19]),
    ] {
        let batch = pipeline.process(&[market_record("swing", prices)]);
        alerted.push(pipeline.alert(&batch.markets).await.alerted);
    }

    assert_eq!(alerted[0], ["swing"]);
    assert!(alerted[1].is_empty());
    assert!(alerted[2].is_empty());
    assert_eq!(notifier.len(), 1);
}

#[tokio::test]
async fn rearm_policy_alerts_again_after_dip() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = Pipeline::new(
        pipeline_config(),
        AlertDeduplicator::new(0.05, DedupPolicyKind::Rearm.build()),
        Arc::new(notifier.clone()),
    );

    for prices in [
        json!([0.42, 0.32, 0.19]),
        json!([0.49, 0.49]),
        json!([0.42, 0.32, 0.19]),
    ] {
        let batch = pipeline.process(&[market_record("swing", prices)]);
        pipeline.alert(&batch.markets).await;
    }

    assert_eq!(notifier.len(), 2);
}

#[test]
fn margins_are_never_negative_and_rounded_to_three_places() {
    let cases = [
        (json!([0.1, 0.2, 0.3]), 0.4),
        (json!([0.333, 0.333, 0.333]), 0.001),
        (json!([0.9, 0.9]), 0.0),
        (json!([1.0]), 0.0),
        (json!([0.1234, 0.5]), 0.377),
        (json!([0.0, 0.0]), 1.0),
    ];

    for (prices, expected) in cases {
        let margin = margin_of(prices.clone());
        assert!(margin >= 0.0, "{prices} produced {margin}");
        assert_eq!(margin, expected, "{prices}");
    }
}

#[tokio::test]
async fn key_alerts_at_most_once_across_many_cycles() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));
    let records = [market_record("steady", json!([0.3, 0.3]))];

    for _ in 0..20 {
        let batch = pipeline.process(&records);
        pipeline.alert(&batch.markets).await;
    }

    assert_eq!(notifier.len(), 1);
}

#[tokio::test]
async fn threshold_is_inclusive() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));
    let batch = pipeline.process(&[
        market_record("at", json!([0.45, 0.30, 0.20])),
        market_record("below", json!([0.48, 0.33, 0.18])),
    ]);

    let outcome = pipeline.alert(&batch.markets).await;

    assert_eq!(outcome.alerted, ["at"]);
}

#[tokio::test]
async fn empty_keys_share_one_dedup_slot() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));
    let batch = pipeline.process(&[
        market_with_question("", "First keyless market", json!([0.4, 0.4])),
        market_with_question("", "Second keyless market", json!([0.3, 0.3])),
    ]);
    assert_eq!(batch.markets.len(), 2);

    let outcome = pipeline.alert(&batch.markets).await;

    assert_eq!(outcome.alerted, [""]);
    assert_eq!(notifier.len(), 1);
    assert!(notifier.messages()[0].contains("First keyless market"));
}

#[test]
fn closed_market_is_not_open_even_when_failing_every_rule() {
    let mut fields = market_fields("worst", json!([]));
    fields.insert("status".into(), json!("closed"));
    fields.insert("question".into(), json!("test-market sentinel"));
    fields.insert("createdAt".into(), json!("2019-01-01T00:00:00Z"));

    let batch = pipeline(Arc::new(RecordingNotifier::new())).process(&[fields.into()]);

    assert_eq!(batch.rejections[0].reason, RejectReason::NotOpen);
}

#[test]
fn filter_rules_apply_in_order() {
    let mut blacklisted_and_old = market_fields("b", json!([0.4]));
    blacklisted_and_old.insert("question".into(), json!("A Test-Market question"));
    blacklisted_and_old.insert("createdAt".into(), json!("2020-01-01T00:00:00Z"));

    let batch = pipeline(Arc::new(RecordingNotifier::new())).process(&[
        market_record("a", json!([])),
        blacklisted_and_old.into(),
    ]);

    let reasons: Vec<_> = batch.rejections.iter().map(|r| r.reason).collect();
    assert_eq!(reasons, [RejectReason::NoPrices, RejectReason::Blacklisted]);
}

#[test]
fn processing_is_idempotent() {
    let records = vec![
        market_record("a", json!([0.42, 0.32, 0.19])),
        market_record("b", json!("[\"0.5\", \"0.4\"]")),
        market_record("c", json!([])),
        market_record("d", json!("not prices")),
    ];

    let first = pipeline(Arc::new(RecordingNotifier::new())).process(&records);
    let second = pipeline(Arc::new(RecordingNotifier::new())).process(&records);

    assert_eq!(first, second);
    assert_eq!(first.markets.len(), 2);
}

#[tokio::test]
async fn cycle_completes_when_every_record_fails() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));
    let mut bad_time = market_fields("t", json!([0.4]));
    bad_time.insert("createdAt".into(), json!("yesterday"));

    let batch = pipeline.process(&[
        market_record("p", json!({"yes": 0.4})),
        market_record("q", json!([0.4, "abc"])),
        bad_time.into(),
    ]);
    let outcome = pipeline.alert(&batch.markets).await;

    assert!(batch.markets.is_empty());
    let kinds: Vec<_> = batch.failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, ["unparsable_prices", "unparsable_prices", "bad_timestamp"]);
    assert!(outcome.alerted.is_empty());
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn alert_message_links_to_market() {
    let notifier = RecordingNotifier::new();
    let mut pipeline = pipeline(Arc::new(notifier.clone()));
    let batch = pipeline.process(&[market_with_question(
        "btc-march",
        "Bitcoin above $40k by March?",
        json!([0.42, 0.32, 0.19]),
    )]);

    pipeline.alert(&batch.markets).await;

    let message = &notifier.messages()[0];
    assert!(message.contains("Bitcoin above $40k by March?"));
    assert!(message.contains("7.0%"));
    assert!(message.contains("Trade $50"));
    assert!(message.ends_with("https://polymarket.com/event/btc-march"));
}
