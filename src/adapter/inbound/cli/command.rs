//! Command-line interface definitions.
//!
//! Defines the CLI structure for the arbwatch application using `clap`:
//! `run` drives the refresh loop, `scan` runs a single cycle and prints the
//! result, and `check config` validates a configuration file.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::infrastructure::config::settings::Config;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "arbwatch.toml";

/// Prediction market arbitrage scanner with deduplicated alerts
#[derive(Parser, Debug)]
#[command(name = "arbwatch")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the arbwatch CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll markets on an interval and alert on new opportunities
    Run(RunArgs),

    /// Run a single cycle and print every admitted market
    Scan(ScanArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

impl Commands {
    /// Configuration file this command reads.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        match self {
            Self::Run(args) => &args.config,
            Self::Scan(args) => &args.config,
            Self::Check(CheckCommand::Config(arg)) => &arg.config,
        }
    }
}

/// Subcommands for `arbwatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and print effective values.
    Config(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Scanner settings that can be overridden per invocation.
///
/// Flags win over both the config file and `ARBWATCH_*` variables.
#[derive(Args, Debug, Default)]
pub struct ScannerOverrides {
    /// Minimum profit margin that triggers an alert (0.05 = 5%).
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Seconds between refresh cycles.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Reject markets created before this year.
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Trade size used for expected profit.
    #[arg(long)]
    pub trade_amount: Option<Decimal>,
}

impl ScannerOverrides {
    /// Copy every flag that was given onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(threshold) = self.threshold {
            config.scanner.min_profit_threshold = threshold;
        }
        if let Some(interval) = self.interval {
            config.scanner.refresh_interval_secs = interval;
        }
        if let Some(min_year) = self.min_year {
            config.scanner.min_year = min_year;
        }
        if let Some(amount) = self.trade_amount {
            config.scanner.trade_amount = amount;
        }
    }
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: ScannerOverrides,

    /// Log level (overrides config and is itself overridden by RUST_LOG).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: ScannerOverrides,

    /// Deliver alerts through the configured notifiers.
    #[arg(long)]
    pub notify: bool,

    /// Also list rejected and unparsable markets.
    #[arg(long)]
    pub all: bool,
}
