//! Handler for the `scan` command: one cycle, printed as a table.

use std::sync::Arc;

use owo_colors::{OwoColorize, Stream};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::command::ScanArgs;
use super::{config, output};
use crate::application::refresh::{CycleReport, RefreshLoop};
use crate::domain::market::ProcessedMarket;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_notifier_registry, build_pipeline, build_source};
use crate::port::outbound::notifier::{Notifier, NullNotifier};

const KEY_WIDTH: usize = 32;
const QUESTION_WIDTH: usize = 48;

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Market")]
    key: String,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "Prices")]
    prices: String,
    #[tabled(rename = "Margin")]
    margin: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Alert")]
    alert: &'static str,
}

#[derive(Tabled)]
struct RejectionRow {
    #[tabled(rename = "Market")]
    key: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Execute the scan command.
///
/// Alerts are only delivered with `--notify`; otherwise the cycle runs
/// against a null notifier and the table shows what would have fired.
pub async fn execute(args: &ScanArgs) -> Result<()> {
    let mut config = config::load(&args.config, &args.overrides)?;
    if output::verbosity() > 0 {
        config.logging.level = if output::verbosity() > 1 {
            "debug".into()
        } else {
            "info".into()
        };
        config.init_logging();
    }

    let notifier: Arc<dyn Notifier> = if args.notify {
        Arc::new(build_notifier_registry(&config))
    } else {
        Arc::new(NullNotifier)
    };
    let pipeline = build_pipeline(&config, notifier)?;
    let mut refresh = RefreshLoop::new(build_source(&config), pipeline, config.refresh_config());
    let report = refresh.run_cycle().await;

    if output::is_json() {
        output::emit_json_line("cycle", serde_json::to_value(&report)?);
        return Ok(());
    }

    print_report(&report, args.all || output::verbosity() > 0);
    Ok(())
}

fn print_report(report: &CycleReport, show_rejections: bool) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Fetched", report.fetched);
    output::field("Admitted", report.batch.markets.len());
    output::field("Rejected", report.batch.rejections.len());
    output::field("Unparsable", report.batch.failures.len());
    output::field("Would alert", report.alerts.alerted.len());
    if let Some(err) = &report.fetch_error {
        output::warning(&format!("fetch failed: {err}"));
    }
    if report.used_fallback {
        output::warning("showing built-in sample markets");
    }

    output::section("Markets");
    if report.batch.markets.is_empty() {
        println!("  {}", output::muted("no markets admitted"));
    } else {
        print_markets(report);
    }

    if show_rejections {
        print_rejections(report);
    }

    if !report.alerts.delivery_failures.is_empty() {
        output::section("Delivery failures");
        for failure in &report.alerts.delivery_failures {
            output::warning(&format!("{}: {}", failure.key, failure.error));
        }
    }
}

fn print_markets(report: &CycleReport) {
    let rows: Vec<MarketRow> = report
        .batch
        .markets
        .iter()
        .map(|market| market_row(market, report.alerts.alerted.contains(&market.key)))
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    let rendered = table.to_string();

    // psql style: header, separator, then one line per market.
    for (index, line) in rendered.lines().enumerate() {
        let profitable = index
            .checked_sub(2)
            .and_then(|row| report.batch.markets.get(row))
            .is_some_and(ProcessedMarket::is_profitable);
        if profitable {
            println!(
                "  {}",
                line.if_supports_color(Stream::Stdout, |t| t.green())
            );
        } else {
            println!("  {line}");
        }
    }
}

fn print_rejections(report: &CycleReport) {
    if !report.batch.rejections.is_empty() {
        output::section("Rejected");
        let rows: Vec<RejectionRow> = report
            .batch
            .rejections
            .iter()
            .map(|rejection| RejectionRow {
                key: rejection.key.clone(),
                reason: rejection.reason.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::psql());
        for line in table.to_string().lines() {
            println!("  {line}");
        }
    }

    if !report.batch.failures.is_empty() {
        output::section("Unparsable");
        for failure in &report.batch.failures {
            output::field(&failure.record, output::muted(&failure.message));
        }
    }
}

fn market_row(market: &ProcessedMarket, alerted: bool) -> MarketRow {
    MarketRow {
        key: clip(&market.key, KEY_WIDTH),
        question: clip(&market.question, QUESTION_WIDTH),
        prices: market
            .prices
            .iter()
            .map(|price| format!("{price:.3}"))
            .collect::<Vec<_>>()
            .join(" / "),
        margin: format!("{:.1}%", market.profit_margin * 100.0),
        profit: format!("${:.2}", market.expected_profit()),
        alert: if alerted { "new" } else { "" },
    }
}

/// Single-line text of at most `width` characters.
fn clip(text: &str, width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        return flat;
    }
    let mut clipped: String = flat.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}
