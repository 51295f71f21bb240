//! Database layer for exlog

mod connection;
mod migrations;
mod repository;
mod sync_state_repository;

pub use connection::Database;
pub use repository::{ExerciseLogRepository, SqliteExerciseLogRepository};
pub use sync_state_repository::{SqliteSyncStateRepository, SyncStateRepository};
