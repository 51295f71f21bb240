//! Health sync: pulls sessions from a `HealthDataSource` into the log store.
//!
//! A pass reads the window since the last successful sync, drains the change
//! feed for edits to older sessions, reconciles everything, and only then
//! advances the cursor. An expired change token is dropped and the pass falls
//! back to re-reading the whole lookback window.

use chrono::{DateTime, Utc};

use crate::config::SyncOptions;
use crate::error::{Error, Result};
use crate::health::{logs_from_sessions, Change, HealthDataSource};
use crate::models::{lookback_start, ChangeToken, ExerciseLog, SyncCursor};
use crate::services::LogService;

/// Outcome of one sync pass
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Logs built from the windowed read
    pub windowed: usize,
    /// Logs built from change-feed upserts older than the window
    pub changed: usize,
    /// Stored logs flagged as conflicting after reconciliation
    pub conflicting: usize,
    /// Whether an expired change token forced a lookback re-read
    pub full_reread: bool,
    /// Start of the window that was read
    pub window_start: DateTime<Utc>,
    /// Every stored log after reconciliation
    pub logs: Vec<ExerciseLog>,
}

/// Drives sync passes with fixed options
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthSync {
    options: SyncOptions,
}

impl HealthSync {
    #[must_use]
    pub const fn new(options: SyncOptions) -> Self {
        Self { options }
    }

    /// Run one sync pass at `now`.
    ///
    /// # Errors
    ///
    /// Source and storage failures abort the pass with the cursor untouched,
    /// as does a lookback that reaches outside the calendar.
    pub async fn run<S: HealthDataSource + ?Sized>(
        &self,
        source: &S,
        service: &LogService,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let cursor = service.load_sync_cursor().await?;
        let lookback = self.options.lookback();
        let mut window_start = cursor.window_start(now, lookback)?;
        let mut full_reread = false;
        let mut changed_logs = Vec::new();
        let mut next_token = None;

        if let Some(token) = cursor.changes_token {
            match Self::drain_changes(source, token, window_start, now).await {
                Ok((logs, token)) => {
                    changed_logs = logs;
                    next_token = Some(token);
                }
                Err(Error::ChangeFeedTokenExpired) => {
                    tracing::warn!(
                        "Change token expired; re-reading the last {} days",
                        self.options.lookback_days
                    );
                    full_reread = true;
                    window_start = window_start.min(lookback_start(now, lookback)?);
                }
                Err(error) => return Err(error),
            }
        }

        let next_token = match next_token {
            Some(token) => token,
            None => source.changes_token(now).await?,
        };

        let sessions = source.read_exercise_sessions(window_start, now).await?;
        let energy = source.read_energy_expenditure(window_start, now).await?;
        let windowed_logs = logs_from_sessions(&sessions, &energy);
        tracing::info!(
            "Read {} health sessions since {}",
            windowed_logs.len(),
            window_start.to_rfc3339()
        );

        let windowed = windowed_logs.len();
        let changed = changed_logs.len();
        let mut incoming = windowed_logs;
        incoming.extend(changed_logs);

        let logs = service.sync_and_detect_conflicts(incoming).await?;
        service
            .save_sync_cursor(&SyncCursor {
                last_synced_at: Some(now),
                changes_token: Some(next_token),
            })
            .await?;

        let conflicting = logs.iter().filter(|log| log.is_conflicting).count();
        Ok(SyncReport {
            windowed,
            changed,
            conflicting,
            full_reread,
            window_start,
            logs,
        })
    }

    /// Follow the change feed to its end, keeping upserts that started before
    /// the read window. Deletions are not applied to the log store.
    async fn drain_changes<S: HealthDataSource + ?Sized>(
        source: &S,
        mut token: ChangeToken,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(Vec<ExerciseLog>, ChangeToken)> {
        let mut sessions = Vec::new();
        let mut energy = Vec::new();

        loop {
            let page = source.get_changes(&token, now).await?;
            for change in page.changes {
                match change {
                    Change::UpsertSession { record } if record.start_time < window_start => {
                        sessions.push(record);
                    }
                    Change::UpsertEnergy { record } if record.start_time < window_start => {
                        energy.push(record);
                    }
                    Change::Deletion { id } => {
                        tracing::debug!("Ignoring health deletion for {id}");
                    }
                    _ => {}
                }
            }
            token = page.next_token;
            if !page.has_more {
                break;
            }
        }

        Ok((logs_from_sessions(&sessions, &energy), token))
    }
}
