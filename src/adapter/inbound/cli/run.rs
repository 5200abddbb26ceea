//! Handler for the `run` command.

use chrono::Utc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use super::command::RunArgs;
use super::{config, output};
use crate::application::refresh::CycleReport;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_refresh_loop;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
///
/// Runs refresh cycles until Ctrl-C. The signal stops the loop between
/// cycles; a cycle already in flight finishes first.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = config::load(&args.config, &args.overrides)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs || output::is_json() {
        config.logging.format = "json".into();
    }
    config.init_logging();

    print_startup(&config);

    let refresh = build_refresh_loop(&config)?;
    let mut reports = refresh.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(refresh.run(shutdown_rx));

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    warn!(error = %err, "Failed to listen for Ctrl-C");
                }
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
                break;
            }
            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = reports.borrow_and_update().clone();
                if let Some(report) = latest {
                    print_cycle(&report);
                }
            }
        }
    }

    if let Err(err) = handle.await {
        warn!(error = %err, "Refresh loop task ended abnormally");
    }
    info!("arbwatch stopped");
    Ok(())
}

fn print_startup(config: &Config) {
    if output::is_quiet() && !output::is_json() {
        return;
    }
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Source", &config.source.gamma_url);
    output::field(
        "Threshold",
        format!("{:.1}%", config.scanner.min_profit_threshold * 100.0),
    );
    output::field(
        "Interval",
        format!("{}s", config.scanner.refresh_interval_secs),
    );
    output::field("Trade amount", format!("${}", config.scanner.trade_amount));
    if output::verbosity() > 0 {
        output::field("Min year", config.scanner.min_year);
        output::field("Blacklist", config.scanner.blacklist.join(", "));
        output::field("Dedup policy", config.scanner.dedup_policy.as_str());
    }
    output::field(
        "Telegram",
        if config.telegram.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    output::section("Cycles");
}

fn print_cycle(report: &CycleReport) {
    let now = Utc::now().format("%H:%M:%S").to_string();

    let mut summary = format!(
        "#{} {} fetched, {} admitted, {} rejected",
        report.cycle,
        report.fetched,
        report.batch.markets.len(),
        report.batch.rejections.len()
    );
    if !report.batch.failures.is_empty() {
        summary.push_str(&format!(", {} unparsable", report.batch.failures.len()));
    }
    if report.used_fallback {
        summary.push_str(" (sample data)");
    }
    output::info(&now, "cycle", &summary);

    for key in &report.alerts.alerted {
        let Some(market) = report.batch.markets.iter().find(|m| &m.key == key) else {
            continue;
        };
        output::alert(
            &now,
            &format!(
                "{} {} {}",
                output::highlight(format!("{:.1}%", market.profit_margin * 100.0)),
                market.question,
                output::muted(&market.trade_link)
            ),
        );
    }

    for failure in &report.alerts.delivery_failures {
        output::warning(&format!(
            "alert for {} not delivered: {}",
            failure.key, failure.error
        ));
    }
}
