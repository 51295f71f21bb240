use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] exlog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Log ID cannot be empty")]
    EmptyLogId,
    #[error("Log not found for id/prefix: {0}")]
    LogNotFound(String),
    #[error("{0}")]
    AmbiguousLogId(String),
    #[error("Unknown exercise type '{0}'. Run `exlog types` to see the options.")]
    UnknownExerciseType(String),
    #[error("Invalid time '{0}'. Use RFC 3339, \"YYYY-MM-DD HH:MM\" or \"HH:MM\".")]
    InvalidTime(String),
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Duration must be at least one minute and within the supported date range")]
    InvalidDuration,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "No health export configured. Pass --source, set EXLOG_HEALTH_EXPORT, or run `exlog config init --health-export <PATH>`."
    )]
    HealthSourceNotConfigured,
}
