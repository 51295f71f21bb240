//! Error types for exlog-core

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias using exlog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in exlog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The record store cannot be opened or reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Operation referenced an exercise log id that does not exist
    #[error("Exercise log not found: {0}")]
    RecordNotFound(String),

    /// Incremental change-feed token is past its validity window
    #[error("Change feed token expired; a full re-read is required")]
    ChangeFeedTokenExpired,

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        if is_unavailable(&error) {
            Self::StorageUnavailable(error.to_string())
        } else {
            Self::Database(error.to_string())
        }
    }
}

fn is_unavailable(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::ReadOnly
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_open_maps_to_storage_unavailable() {
        let error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            Some("unable to open database file".to_string()),
        );
        assert!(matches!(Error::from(error), Error::StorageUnavailable(_)));
    }

    #[test]
    fn other_sqlite_errors_map_to_database() {
        let error = rusqlite::Error::QueryReturnedNoRows;
        assert!(matches!(Error::from(error), Error::Database(_)));
    }
}
