//! Effective configuration for a CLI invocation.
//!
//! Precedence, lowest first: built-in defaults, the TOML file,
//! `ARBWATCH_*` environment variables, command-line flags.

use std::path::Path;

use super::command::ScannerOverrides;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load config for `run` and `scan`. A missing file falls back to defaults.
pub fn load(path: &Path, overrides: &ScannerOverrides) -> Result<Config> {
    let mut config = Config::load_or_default(path)?;
    resolve(&mut config, overrides)?;
    Ok(config)
}

/// Load config for `check config`. The file must exist.
pub fn load_strict(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    resolve(&mut config, &ScannerOverrides::default())?;
    Ok(config)
}

fn resolve(config: &mut Config, overrides: &ScannerOverrides) -> Result<()> {
    config.apply_env()?;
    overrides.apply(config);
    config.validate()
}
