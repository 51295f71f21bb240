//! Persistent CLI configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use exlog_core::config::SyncOptions;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";
const APP_DIR: &str = "exlog";
const DB_FILE_NAME: &str = "exlog.db";

pub const DB_PATH_ENV: &str = "EXLOG_DB_PATH";
pub const HEALTH_EXPORT_ENV: &str = "EXLOG_HEALTH_EXPORT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub health_export_path: Option<PathBuf>,
    #[serde(default)]
    pub lookback_days: Option<u32>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            db_path: None,
            health_export_path: None,
            lookback_days: None,
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn default_db_path() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DB_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI data directory".to_string())
}

fn normalize_path_option(value: Option<PathBuf>) -> Option<PathBuf> {
    let value = value?;
    exlog_core::util::normalize_text_option(Some(value.to_string_lossy().into_owned()))
        .map(PathBuf::from)
}

fn first_path(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
    configured: Option<&Path>,
) -> Option<PathBuf> {
    normalize_path_option(flag)
        .or_else(|| normalize_path_option(env_value.map(PathBuf::from)))
        .or_else(|| configured.map(Path::to_path_buf))
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Database path: flag, then `EXLOG_DB_PATH`, then config, then the data dir.
    pub fn resolve_db_path(&self, flag: Option<PathBuf>) -> Result<PathBuf, String> {
        self.resolve_db_path_with(flag, std::env::var_os(DB_PATH_ENV))
    }

    pub fn resolve_db_path_with(
        &self,
        flag: Option<PathBuf>,
        env_value: Option<OsString>,
    ) -> Result<PathBuf, String> {
        match first_path(flag, env_value, self.db_path.as_deref()) {
            Some(path) => Ok(path),
            None => default_db_path(),
        }
    }

    /// Health export path: flag, then `EXLOG_HEALTH_EXPORT`, then config.
    pub fn resolve_health_export_path(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        self.resolve_health_export_path_with(flag, std::env::var_os(HEALTH_EXPORT_ENV))
    }

    pub fn resolve_health_export_path_with(
        &self,
        flag: Option<PathBuf>,
        env_value: Option<OsString>,
    ) -> Option<PathBuf> {
        first_path(flag, env_value, self.health_export_path.as_deref())
    }

    pub fn sync_options(&self) -> SyncOptions {
        let options = SyncOptions::default();
        match self.lookback_days {
            Some(days) => options.with_lookback_days(days),
            None => options,
        }
    }

    fn normalize(&mut self) {
        self.db_path = normalize_path_option(self.db_path.take());
        self.health_export_path = normalize_path_option(self.health_export_path.take());
        self.lookback_days = self.lookback_days.filter(|days| *days > 0);
    }
}
