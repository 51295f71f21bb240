//! Data models for exlog

mod exercise_log;
mod exercise_type;
mod sync_cursor;

pub use exercise_log::{ExerciseLog, ExerciseLogId, LogOrigin, NewExerciseLog};
pub use exercise_type::ExerciseType;
pub use sync_cursor::{lookback_start, ChangeToken, SyncCursor};
