//! CLI module graph and command dispatch.

pub mod check;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod output;
pub mod run;
pub mod scan;

use command::{CheckCommand, Cli, Commands};
use output::OutputConfig;

use crate::error::Result;

/// Apply global flags and run the selected command.
pub async fn execute(cli: &Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    output::set_color(&cli.color);

    match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Scan(args) => scan::execute(args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    }
}
