//! exlog-core - Core library for exlog
//!
//! This crate contains the exercise log models, the `SQLite` store, conflict
//! reconciliation, and the health sync shared by all exlog interfaces.

pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod models;
pub mod reconcile;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{ExerciseLog, ExerciseLogId, ExerciseType, LogOrigin, NewExerciseLog};
