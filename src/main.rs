use std::process::ExitCode;

use arbwatch::adapter::inbound::cli::{self, command::Cli, diagnostic};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli::execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = diagnostic::report(&err, cli.command.config_path());
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}
