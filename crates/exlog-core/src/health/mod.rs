//! Health data source abstraction.
//!
//! The source is an external provider of exercise sessions and energy
//! expenditure records with a windowed read and an incremental change feed.

mod json_export;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ChangeToken, ExerciseLog, ExerciseLogId, ExerciseType, LogOrigin};

pub use json_export::{HealthExport, JsonExportSource, CHANGES_PAGE_SIZE};

/// One exercise session as reported by the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Source-assigned record id, reused as the log id
    pub id: String,
    /// Platform exercise-type code
    pub exercise_type: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Total energy burned over a time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub kilocalories: f64,
}

/// One entry of the change feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    UpsertSession { record: SessionRecord },
    UpsertEnergy { record: EnergyRecord },
    Deletion { id: String },
}

/// A page of the change feed and where to continue from
#[derive(Debug, Clone, PartialEq)]
pub struct ChangesPage {
    pub changes: Vec<Change>,
    pub next_token: ChangeToken,
    pub has_more: bool,
}

/// Read access to a health data provider
#[allow(async_fn_in_trait)]
pub trait HealthDataSource {
    /// Sessions starting within `[start, end)`
    async fn read_exercise_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>>;

    /// Energy records starting within `[start, end)`
    async fn read_energy_expenditure(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnergyRecord>>;

    /// Token positioned at the current end of the change feed
    async fn changes_token(&self, now: DateTime<Utc>) -> Result<ChangeToken>;

    /// Next page of changes after `token`.
    ///
    /// Fails with `ChangeFeedTokenExpired` once the token is past the
    /// source's validity window.
    async fn get_changes(&self, token: &ChangeToken, now: DateTime<Utc>) -> Result<ChangesPage>;
}

/// Convert sessions into synced logs, taking calories from the energy record
/// that starts at exactly the same instant as the session.
///
/// Sessions with an empty or inverted time range are skipped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn logs_from_sessions(sessions: &[SessionRecord], energy: &[EnergyRecord]) -> Vec<ExerciseLog> {
    let calories_by_start = energy
        .iter()
        .map(|record| (record.start_time, record.kilocalories))
        .collect::<HashMap<_, _>>();

    sessions
        .iter()
        .filter_map(|session| {
            let calories = calories_by_start
                .get(&session.start_time)
                .map_or(0, |kcal| kcal.max(0.0) as u32);

            match ExerciseLog::new(
                ExerciseLogId::from(session.id.as_str()),
                ExerciseType::from_platform_code(session.exercise_type),
                session.start_time,
                session.end_time,
                calories,
                LogOrigin::Synced,
            ) {
                Ok(log) => Some(log),
                Err(error) => {
                    tracing::warn!("Skipping health session {}: {error}", session.id);
                    None
                }
            }
        })
        .collect()
}
