//! Miette-based error diagnostics for CLI error presentation.
//!
//! Converts crate errors into reports with a diagnostic code, help text and,
//! for TOML syntax errors, a labeled snippet of the offending config file.

use std::fmt::Display;
use std::path::Path;

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, Error};

/// Configuration syntax error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(arbwatch::config::parse))]
pub struct ConfigSyntaxError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

/// Any other fatal error, with a code and optional help.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
    pub code: &'static str,
    pub help: Option<&'static str>,
}

impl CommandError {
    fn new(code: &'static str, message: impl Into<String>, help: Option<&'static str>) -> Self {
        Self {
            message: message.into(),
            code,
            help,
        }
    }
}

impl Diagnostic for CommandError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help.map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }
}

/// Build a report for `err`. `config_path` is re-read to show TOML context.
#[must_use]
pub fn report(err: &Error, config_path: &Path) -> Report {
    if let Error::Config(ConfigError::Parse(parse)) = err {
        if let Ok(content) = std::fs::read_to_string(config_path) {
            return Report::new(ConfigSyntaxError {
                message: format!("failed to parse {}", config_path.display()),
                src: NamedSource::new(config_path.display().to_string(), content),
                span: parse.span().map(SourceSpan::from),
                help: Some(parse.message().to_string()),
            });
        }
    }
    Report::new(describe(err, config_path))
}

fn describe(err: &Error, config_path: &Path) -> CommandError {
    let message = err.to_string();
    match err {
        Error::Config(ConfigError::ReadFile(_)) => CommandError::new(
            "arbwatch::config::read",
            format!("{message} ({})", config_path.display()),
            Some("pass --config <path> or create arbwatch.toml in the working directory"),
        ),
        Error::Config(ConfigError::InvalidValue { .. } | ConfigError::MissingField { .. }) => {
            CommandError::new(
                "arbwatch::config::invalid",
                message,
                Some("run `arbwatch check config` to see the effective values"),
            )
        }
        Error::Config(ConfigError::Parse(_)) => {
            CommandError::new("arbwatch::config::parse", message, None)
        }
        Error::Json(_) => CommandError::new("arbwatch::json", message, None),
    }
}
