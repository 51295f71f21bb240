use std::path::{Path, PathBuf};

use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

pub fn apply_config_init(
    mut config: CliConfig,
    database: Option<PathBuf>,
    health_export: Option<PathBuf>,
    lookback_days: Option<u32>,
) -> CliConfig {
    if database.is_some() {
        config.db_path = database;
    }
    if health_export.is_some() {
        config.health_export_path = health_export;
    }
    if lookback_days.is_some() {
        config.lookback_days = lookback_days;
    }
    config
}

pub fn run_config_init(
    database: Option<PathBuf>,
    health_export: Option<PathBuf>,
    lookback_days: Option<u32>,
) -> Result<(), CliError> {
    let path = default_config_path().map_err(CliError::Config)?;
    run_config_init_at(&path, database, health_export, lookback_days)
}

pub fn run_config_init_at(
    path: &Path,
    database: Option<PathBuf>,
    health_export: Option<PathBuf>,
    lookback_days: Option<u32>,
) -> Result<(), CliError> {
    let existing = CliConfig::load_from_path(path).map_err(CliError::Config)?;
    let config = apply_config_init(existing, database, health_export, lookback_days);
    config.save_to_path(path).map_err(CliError::Config)?;
    println!("Saved config to {}", path.display());
    Ok(())
}

pub fn run_config_show() -> Result<(), CliError> {
    let path = default_config_path().map_err(CliError::Config)?;
    let config = CliConfig::load_from_path(&path).map_err(CliError::Config)?;

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
