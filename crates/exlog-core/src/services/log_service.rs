//! Shared log service used by clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::db::{
    Database, ExerciseLogRepository, SqliteExerciseLogRepository, SqliteSyncStateRepository,
    SyncStateRepository,
};
use crate::error::{Error, Result};
use crate::models::{ExerciseLog, ExerciseLogId, NewExerciseLog, SyncCursor};
use crate::reconcile::LogReconciler;

/// Thread-safe service for exercise log operations.
#[derive(Clone)]
pub struct LogService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl LogService {
    /// Open the log store at the given filesystem path, creating parent
    /// directories as needed.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                Error::StorageUnavailable(format!("{}: {error}", parent.display()))
            })?;
        }

        let db = Database::open(&db_path)?;
        tracing::debug!("Opened log store at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory log store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Record a manual entry and re-check conflicts.
    ///
    /// Returns the stored log, flagged if it overlaps another log of the same
    /// type.
    pub async fn add_log(&self, entry: NewExerciseLog) -> Result<ExerciseLog> {
        let log = entry.into_log()?;
        let id = log.id.clone();

        let logs = self.sync_and_detect_conflicts(vec![log]).await?;
        logs.into_iter()
            .find(|log| log.id == id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))
    }

    /// Upsert incoming logs and flag overlaps; returns the full stored set.
    pub async fn sync_and_detect_conflicts(
        &self,
        incoming: Vec<ExerciseLog>,
    ) -> Result<Vec<ExerciseLog>> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        LogReconciler::new(&repo).sync_and_detect_conflicts(&incoming)
    }

    /// Clear the conflict flag of one log.
    pub async fn resolve_conflict(&self, id: &ExerciseLogId) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        LogReconciler::new(&repo).resolve_conflict(id)
    }

    /// Delete one log.
    pub async fn delete_log(&self, id: &ExerciseLogId) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        LogReconciler::new(&repo).delete_log(id)
    }

    /// All logs, oldest start first.
    pub async fn list_logs(&self) -> Result<Vec<ExerciseLog>> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        repo.get_all()
    }

    /// Logs starting on the given UTC day.
    pub async fn list_logs_by_day(&self, day: NaiveDate) -> Result<Vec<ExerciseLog>> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        repo.list_by_day(day)
    }

    /// Logs currently flagged as conflicting.
    pub async fn list_conflicting_logs(&self) -> Result<Vec<ExerciseLog>> {
        Ok(self
            .list_logs()
            .await?
            .into_iter()
            .filter(|log| log.is_conflicting)
            .collect())
    }

    /// Fetch a log by id.
    pub async fn get_log(&self, id: &ExerciseLogId) -> Result<Option<ExerciseLog>> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        repo.get_by_id(id)
    }

    /// Fetch a log that must exist.
    pub async fn require_log(&self, id: &ExerciseLogId) -> Result<ExerciseLog> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        LogReconciler::new(&repo).require(id)
    }

    /// Ids starting with `prefix`, most recent first.
    pub async fn list_log_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let repo = SqliteExerciseLogRepository::new(db.connection());
        repo.list_ids_by_prefix(prefix, limit)
    }

    /// Load the health sync cursor.
    pub async fn load_sync_cursor(&self) -> Result<SyncCursor> {
        let db = self.db.lock().await;
        SqliteSyncStateRepository::new(db.connection()).load_cursor()
    }

    /// Persist the health sync cursor.
    pub async fn save_sync_cursor(&self, cursor: &SyncCursor) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSyncStateRepository::new(db.connection()).save_cursor(cursor)
    }

    /// Forget health sync progress; the next sync starts from the lookback.
    pub async fn reset_sync_cursor(&self) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSyncStateRepository::new(db.connection()).clear_cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeToken, ExerciseType, LogOrigin};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn synced(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ExerciseLog {
        ExerciseLog::new(
            ExerciseLogId::from(id),
            ExerciseType::Running,
            start,
            end,
            250,
            LogOrigin::Synced,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn add_log_flags_overlap_with_synced_log() {
        let service = LogService::open_in_memory().await.unwrap();
        service
            .sync_and_detect_conflicts(vec![synced("hc-1", at(9, 0), at(10, 0))])
            .await
            .unwrap();

        let added = service
            .add_log(
                NewExerciseLog::new(ExerciseType::Running, at(9, 30))
                    .with_duration(0, 45)
                    .with_calories(300),
            )
            .await
            .unwrap();

        assert!(added.is_conflicting);
        assert_eq!(added.origin, LogOrigin::Manual);
        assert_eq!(added.duration_minutes, 45);

        let conflicting = service.list_conflicting_logs().await.unwrap();
        assert_eq!(conflicting.len(), 2);
    }

    #[tokio::test]
    async fn add_log_without_overlap() {
        let service = LogService::open_in_memory().await.unwrap();

        let added = service
            .add_log(NewExerciseLog::new(ExerciseType::Yoga, at(7, 0)).with_duration(1, 0))
            .await
            .unwrap();

        assert!(!added.is_conflicting);
        assert_eq!(service.get_log(&added.id).await.unwrap(), Some(added));
    }

    #[tokio::test]
    async fn add_log_rejects_zero_duration() {
        let service = LogService::open_in_memory().await.unwrap();

        let result = service
            .add_log(NewExerciseLog::new(ExerciseType::Yoga, at(7, 0)))
            .await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(service.list_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_and_delete_through_service() {
        let service = LogService::open_in_memory().await.unwrap();
        service
            .sync_and_detect_conflicts(vec![
                synced("a", at(9, 0), at(10, 0)),
                synced("b", at(9, 30), at(10, 30)),
            ])
            .await
            .unwrap();

        service.resolve_conflict(&ExerciseLogId::from("a")).await.unwrap();
        service.delete_log(&ExerciseLogId::from("b")).await.unwrap();

        let logs = service.list_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].is_conflicting);
    }

    #[tokio::test]
    async fn prefix_lookup_and_day_listing() {
        let service = LogService::open_in_memory().await.unwrap();
        service
            .sync_and_detect_conflicts(vec![
                synced("abc-1", at(6, 0), at(6, 30)),
                synced("abd-2", at(8, 0), at(8, 30)),
            ])
            .await
            .unwrap();

        let ids = service.list_log_ids_by_prefix("ab", 10).await.unwrap();
        assert_eq!(ids, vec!["abd-2".to_string(), "abc-1".to_string()]);

        let day = service
            .list_logs_by_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
    }

    #[tokio::test]
    async fn sync_cursor_lifecycle() {
        let service = LogService::open_in_memory().await.unwrap();
        let cursor = SyncCursor {
            last_synced_at: Some(at(12, 0)),
            changes_token: Some(ChangeToken::new(3, at(12, 0))),
        };

        service.save_sync_cursor(&cursor).await.unwrap();
        assert_eq!(service.load_sync_cursor().await.unwrap(), cursor);

        service.reset_sync_cursor().await.unwrap();
        assert_eq!(
            service.load_sync_cursor().await.unwrap(),
            SyncCursor::default()
        );
    }

    #[tokio::test]
    async fn open_path_creates_parent_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("exlog.db");

        {
            let service = LogService::open_path(&path).await.unwrap();
            assert_eq!(service.db_path(), Some(path.as_path()));
            service
                .sync_and_detect_conflicts(vec![synced("kept", at(9, 0), at(9, 30))])
                .await
                .unwrap();
        }

        let reopened = LogService::open_path(&path).await.unwrap();
        assert_eq!(reopened.list_logs().await.unwrap().len(), 1);
    }
}
