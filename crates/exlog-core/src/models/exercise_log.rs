//! Exercise log model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ExerciseType;
use crate::error::{Error, Result};

/// Identifier of an exercise log.
///
/// Manual entries get a UUID v7; synced entries keep the health source's id,
/// which is an arbitrary non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseLogId(String);

impl ExerciseLogId {
    /// Create a new client-generated id using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ExerciseLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExerciseLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExerciseLogId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("exercise log id cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for ExerciseLogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where a log came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrigin {
    /// Entered by the user
    Manual,
    /// Imported from the health data source
    Synced,
}

impl LogOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Synced => "synced",
        }
    }
}

impl FromStr for LogOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(Self::Manual),
            "synced" => Ok(Self::Synced),
            other => Err(Error::InvalidInput(format!("unknown log origin: {other}"))),
        }
    }
}

/// A recorded exercise session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseLog {
    /// Unique identifier
    pub id: ExerciseLogId,
    /// Exercise category
    pub exercise_type: ExerciseType,
    /// Session start (inclusive)
    pub start_time: DateTime<Utc>,
    /// Session end (exclusive), always after `start_time`
    pub end_time: DateTime<Utc>,
    /// Whole minutes between start and end
    pub duration_minutes: i64,
    /// Energy burned in kilocalories, zero when unknown
    pub calories_burned: u32,
    /// Manual entry or synced record
    pub origin: LogOrigin,
    /// Set when another log of the same type overlaps this one
    pub is_conflicting: bool,
}

impl ExerciseLog {
    /// Build a log, deriving the stored duration from the time range.
    pub fn new(
        id: ExerciseLogId,
        exercise_type: ExerciseType,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        calories_burned: u32,
        origin: LogOrigin,
    ) -> Result<Self> {
        if start_time >= end_time {
            return Err(Error::InvalidInput(format!(
                "exercise log {id} must start before it ends"
            )));
        }

        Ok(Self {
            id,
            exercise_type,
            start_time,
            end_time,
            duration_minutes: (end_time - start_time).num_minutes(),
            calories_burned,
            origin,
            is_conflicting: false,
        })
    }

    /// Half-open interval overlap with another log of the same type.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.id != other.id
            && self.exercise_type == other.exercise_type
            && self.start_time < other.end_time
            && self.end_time > other.start_time
    }
}

/// Manual entry input, mirroring what the entry form collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExerciseLog {
    pub exercise_type: ExerciseType,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub calories_burned: u32,
}

impl NewExerciseLog {
    #[must_use]
    pub const fn new(exercise_type: ExerciseType, start_time: DateTime<Utc>) -> Self {
        Self {
            exercise_type,
            start_time,
            duration_minutes: 0,
            calories_burned: 0,
        }
    }

    /// Set the duration from the form's hour and minute pickers.
    ///
    /// Out-of-range totals saturate and are rejected by `into_log`.
    #[must_use]
    pub const fn with_duration(mut self, hours: i64, minutes: i64) -> Self {
        self.duration_minutes = hours.saturating_mul(60).saturating_add(minutes);
        self
    }

    #[must_use]
    pub const fn with_calories(mut self, calories: u32) -> Self {
        self.calories_burned = calories;
        self
    }

    /// End of the session implied by start and duration
    pub fn end_time(&self) -> Result<DateTime<Utc>> {
        Duration::try_minutes(self.duration_minutes)
            .and_then(|duration| self.start_time.checked_add_signed(duration))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "exercise duration of {} minutes is out of range",
                    self.duration_minutes
                ))
            })
    }

    /// Turn the entry into a stored log with a fresh id.
    pub fn into_log(self) -> Result<ExerciseLog> {
        if self.duration_minutes <= 0 {
            return Err(Error::InvalidInput(
                "exercise duration must be at least one minute".into(),
            ));
        }

        let end_time = self.end_time()?;
        ExerciseLog::new(
            ExerciseLogId::new(),
            self.exercise_type,
            self.start_time,
            end_time,
            self.calories_burned,
            LogOrigin::Manual,
        )
    }
}
