//! Health data source backed by a JSON export file

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Change, ChangesPage, EnergyRecord, HealthDataSource, SessionRecord};
use crate::error::{Error, Result};
use crate::models::ChangeToken;

/// Maximum number of changes returned per page
pub const CHANGES_PAGE_SIZE: usize = 100;

/// On-disk layout of a health export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthExport {
    pub sessions: Vec<SessionRecord>,
    pub energy: Vec<EnergyRecord>,
    /// Change feed in the order the changes happened
    pub changes: Vec<Change>,
}

/// `HealthDataSource` reading from a `HealthExport`.
///
/// Change token positions index into the export's change list.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    export: HealthExport,
    token_ttl: Duration,
}

impl JsonExportSource {
    /// Wrap an in-memory export
    #[must_use]
    pub const fn new(export: HealthExport, token_ttl: Duration) -> Self {
        Self { export, token_ttl }
    }

    /// Load an export file
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the file cannot be read and
    /// `Serialization` if it is not a valid export.
    pub fn load(path: &Path, token_ttl: Duration) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            Error::StorageUnavailable(format!(
                "cannot read health export {}: {error}",
                path.display()
            ))
        })?;
        Self::from_json(&raw, token_ttl)
    }

    /// Parse an export from JSON text
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the text is not a valid export.
    pub fn from_json(raw: &str, token_ttl: Duration) -> Result<Self> {
        let export = serde_json::from_str(raw)?;
        Ok(Self::new(export, token_ttl))
    }

    fn feed_len(&self) -> u64 {
        self.export.changes.len() as u64
    }
}

fn starts_within(start_time: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start_time >= start && start_time < end
}

impl HealthDataSource for JsonExportSource {
    async fn read_exercise_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>> {
        Ok(self
            .export
            .sessions
            .iter()
            .filter(|session| starts_within(session.start_time, start, end))
            .cloned()
            .collect())
    }

    async fn read_energy_expenditure(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnergyRecord>> {
        Ok(self
            .export
            .energy
            .iter()
            .filter(|record| starts_within(record.start_time, start, end))
            .cloned()
            .collect())
    }

    async fn changes_token(&self, now: DateTime<Utc>) -> Result<ChangeToken> {
        Ok(ChangeToken::new(self.feed_len(), now))
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn get_changes(&self, token: &ChangeToken, now: DateTime<Utc>) -> Result<ChangesPage> {
        if token.is_expired(now, self.token_ttl) {
            return Err(Error::ChangeFeedTokenExpired);
        }

        let len = self.export.changes.len();
        let from = token.position().min(self.feed_len()) as usize;
        let to = (from + CHANGES_PAGE_SIZE).min(len);

        Ok(ChangesPage {
            changes: self.export.changes[from..to].to_vec(),
            next_token: ChangeToken::new(to as u64, now),
            has_more: to < len,
        })
    }
}
