mod support;

use std::sync::Arc;
use std::time::Duration;

use arbwatch::error::{DeliveryError, FetchError};
use serde_json::json;
use support::{
    market_record, refresh_loop, FailingNotifier, RecordingNotifier, ScriptedSource,
    StalledNotifier,
};
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};

const INTERVAL: Duration = Duration::from_secs(10);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

fn live_markets() -> Vec<arbwatch::domain::RawMarketRecord> {
    vec![
        market_record("live-a", json!([0.42, 0.32, 0.19])),
        market_record("live-b", json!([0.5, 0.5])),
    ]
}

#[tokio::test(start_paused = true)]
async fn runs_one_cycle_per_interval() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(35)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // Ticks at 0s, 10s, 20s and 30s.
    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn slow_cycles_never_overlap() {
    let source = Arc::new(
        ScriptedSource::always(live_markets()).with_delay(Duration::from_secs(25)),
    );
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        Duration::from_secs(60),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(100)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(source.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn overrunning_cycle_drops_missed_ticks() {
    let origin = Instant::now();
    let source = Arc::new(
        ScriptedSource::always(live_markets()).with_delay(Duration::from_secs(15)),
    );
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        Duration::from_secs(60),
    );
    let mut reports = refresh.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(61)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // Each 15s cycle swallows the 10s boundary behind it; the next cycle
    // waits for the following boundary instead of starting back-to-back.
    let starts: Vec<u64> = source
        .started_at()
        .iter()
        .map(|at| at.duration_since(origin).as_secs())
        .collect();
    assert_eq!(starts, [0, 20, 40, 60]);

    let latest = reports.borrow_and_update().clone().unwrap();
    assert_eq!(latest.cycle, 4);
    assert_eq!(latest.skipped_ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn cycles_within_interval_skip_nothing() {
    let source = Arc::new(
        ScriptedSource::always(live_markets()).with_delay(Duration::from_secs(4)),
    );
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );
    let mut reports = refresh.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(25)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(source.calls(), 3);
    let latest = reports.borrow_and_update().clone().unwrap();
    assert_eq!(latest.skipped_ticks, 0);
}

#[tokio::test(start_paused = true)]
async fn alert_state_survives_across_cycles() {
    let notifier = RecordingNotifier::new();
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let refresh = refresh_loop(source, Arc::new(notifier.clone()), INTERVAL, FETCH_TIMEOUT);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(45)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(notifier.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn margin_swing_across_cycles_alerts_once() {
    let notifier = RecordingNotifier::new();
    let source = Arc::new(ScriptedSource::sequence(vec![
        Ok(vec![market_record("swing", json!([0.42, 0.32, 0.19]))]),
        Ok(vec![market_record("swing", json!([0.49, 0.49]))]),
        Ok(vec![market_record("swing", json!([0.42, 0.32, 0.19]))]),
    ]));
    let mut refresh = refresh_loop(source, Arc::new(notifier.clone()), INTERVAL, FETCH_TIMEOUT);

    let alerted: Vec<_> = [
        refresh.run_cycle().await,
        refresh.run_cycle().await,
        refresh.run_cycle().await,
    ]
    .into_iter()
    .map(|report| report.alerts.alerted.len())
    .collect();

    assert_eq!(alerted, [1, 0, 0]);
    assert_eq!(notifier.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_error_falls_back_to_sample_data() {
    let source = Arc::new(ScriptedSource::failing(FetchError::Status { status: 503 }));
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );

    let report = refresh.run_cycle().await;

    assert!(report.used_fallback);
    assert_eq!(
        report.fetch_error.as_deref(),
        Some("unexpected HTTP status 503")
    );
    assert_eq!(report.fetched, 3);
    let keys: Vec<_> = report.batch.markets.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, ["btc-march", "election", "eth-april"]);
    // Sample data goes through the alert stage like live data.
    assert_eq!(report.alerts.alerted, ["btc-march", "election"]);
}

#[tokio::test(start_paused = true)]
async fn empty_fetch_falls_back_without_error() {
    let source = Arc::new(ScriptedSource::always(Vec::new()));
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );

    let report = refresh.run_cycle().await;

    assert!(report.used_fallback);
    assert!(report.fetch_error.is_none());
    assert_eq!(report.batch.markets.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn hung_fetch_times_out_and_falls_back() {
    let source = Arc::new(
        ScriptedSource::always(live_markets()).with_delay(Duration::from_secs(3600)),
    );
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        Duration::from_secs(2),
    );

    let report = refresh.run_cycle().await;

    assert!(report.used_fallback);
    assert_eq!(
        report.fetch_error.as_deref(),
        Some("market fetch timed out after 2000ms")
    );
}

#[tokio::test(start_paused = true)]
async fn source_recovers_after_failure() {
    let source = Arc::new(ScriptedSource::sequence(vec![
        Err(FetchError::Request("connection refused".into())),
        Ok(live_markets()),
    ]));
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );

    let first = refresh.run_cycle().await;
    let second = refresh.run_cycle().await;

    assert!(first.used_fallback);
    assert!(!second.used_fallback);
    assert_eq!(second.cycle, 2);
    assert_eq!(second.batch.markets[0].key, "live-a");
}

#[tokio::test(start_paused = true)]
async fn failed_delivery_is_reported_and_not_retried() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let mut refresh = refresh_loop(source, Arc::new(FailingNotifier), INTERVAL, FETCH_TIMEOUT);

    let first = refresh.run_cycle().await;
    let second = refresh.run_cycle().await;

    assert_eq!(first.alerts.alerted, ["live-a"]);
    assert_eq!(first.alerts.delivery_failures.len(), 1);
    assert!(second.alerts.alerted.is_empty());
    assert!(second.alerts.delivery_failures.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stalled_notifier_is_bounded_by_timeout() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let notifier = StalledNotifier {
        delay: Duration::from_secs(3600),
    };
    let mut refresh = refresh_loop(source, Arc::new(notifier), INTERVAL, FETCH_TIMEOUT);

    let report = refresh.run_cycle().await;

    assert_eq!(report.alerts.alerted, ["live-a"]);
    assert_eq!(
        report.alerts.delivery_failures[0].error,
        DeliveryError::Timeout { after_ms: 1000 }.to_string()
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_wait_between_cycles() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        Duration::from_secs(3600),
        FETCH_TIMEOUT,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(true).unwrap();

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop should stop promptly")
        .unwrap();
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_loop_does_nothing() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let refresh = refresh_loop(
        source.clone(),
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);

    refresh.run(shutdown_rx).await;

    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_shutdown_sender_stops_loop() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    sleep(Duration::from_secs(1)).await;
    drop(shutdown_tx);

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop should stop when the sender is gone")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_latest_report() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );
    let mut reports = refresh.subscribe();
    assert!(reports.borrow().is_none());

    refresh.run_cycle().await;
    refresh.run_cycle().await;

    assert!(reports.has_changed().unwrap());
    let latest = reports.borrow_and_update().clone().unwrap();
    assert_eq!(latest.cycle, 2);
    assert_eq!(latest.fetched, 2);
}

#[tokio::test(start_paused = true)]
async fn report_serializes_flat() {
    let source = Arc::new(ScriptedSource::always(live_markets()));
    let mut refresh = refresh_loop(
        source,
        Arc::new(RecordingNotifier::new()),
        INTERVAL,
        FETCH_TIMEOUT,
    );

    let report = refresh.run_cycle().await;
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["cycle"], 1);
    assert_eq!(value["markets"][0]["key"], "live-a");
    assert_eq!(value["alerted"][0], "live-a");
    assert_eq!(value["used_fallback"], false);
}
