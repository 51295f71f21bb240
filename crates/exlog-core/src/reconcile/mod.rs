//! Log reconciliation: merging incoming logs and flagging overlaps.
//!
//! Two logs conflict when they share an exercise type and their half-open
//! `[start, end)` ranges overlap. Detection only ever sets flags; clearing is
//! an explicit user action on one log at a time.

use crate::db::ExerciseLogRepository;
use crate::error::{Error, Result};
use crate::models::{ExerciseLog, ExerciseLogId};

/// Applies incoming logs and user resolutions to a log repository
pub struct LogReconciler<'a, R: ExerciseLogRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: ExerciseLogRepository + ?Sized> LogReconciler<'a, R> {
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Upsert `incoming`, flag every stored log that overlaps another log of
    /// the same type, and return all stored logs ordered by start time.
    pub fn sync_and_detect_conflicts(&self, incoming: &[ExerciseLog]) -> Result<Vec<ExerciseLog>> {
        self.repo.upsert_many(incoming)?;
        tracing::debug!("Upserted {} incoming exercise logs", incoming.len());

        let overlapping = self.repo.find_overlapping()?;
        let flagged = overlapping
            .into_iter()
            .filter(|log| !log.is_conflicting)
            .map(|mut log| {
                log.is_conflicting = true;
                log
            })
            .collect::<Vec<_>>();

        if !flagged.is_empty() {
            tracing::info!("Flagged {} exercise logs as conflicting", flagged.len());
            self.repo.upsert_many(&flagged)?;
        }

        self.repo.get_all()
    }

    /// Keep a conflicting log: clear its flag and nothing else.
    pub fn resolve_conflict(&self, id: &ExerciseLogId) -> Result<()> {
        self.repo.set_conflict_flag(id, false)
    }

    /// Remove a log. Flags on logs it conflicted with are left as they are.
    pub fn delete_log(&self, id: &ExerciseLogId) -> Result<()> {
        self.repo.delete_by_id(id)
    }

    /// Fetch a log or fail with `RecordNotFound`
    pub fn require(&self, id: &ExerciseLogId) -> Result<ExerciseLog> {
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SqliteExerciseLogRepository};
    use crate::models::{ExerciseType, LogOrigin};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn log(
        id: &str,
        kind: ExerciseType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        origin: LogOrigin,
    ) -> ExerciseLog {
        ExerciseLog::new(id.into(), kind, start, end, 0, origin).unwrap()
    }

    fn flags(logs: &[ExerciseLog]) -> Vec<(&str, bool)> {
        logs.iter()
            .map(|log| (log.id.as_str(), log.is_conflicting))
            .collect()
    }

    #[test]
    fn overlapping_sync_flags_both_and_sorts_by_start() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        let a = log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual);
        repo.upsert_one(&a).unwrap();

        let b = log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced);
        let result = reconciler.sync_and_detect_conflicts(&[b]).unwrap();

        assert_eq!(flags(&result), vec![("A", true), ("B", true)]);
        assert_eq!(flags(&repo.get_all().unwrap()), vec![("A", true), ("B", true)]);
    }

    #[test]
    fn same_interval_different_type_is_not_flagged() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        let a = log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual);
        let c = log("C", ExerciseType::Boxing, at(9, 0), at(9, 30), LogOrigin::Synced);
        let result = reconciler.sync_and_detect_conflicts(&[a, c]).unwrap();

        assert_eq!(flags(&result), vec![("A", false), ("C", false)]);
    }

    #[test]
    fn adjacent_and_disjoint_intervals_are_not_flagged() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        let result = reconciler
            .sync_and_detect_conflicts(&[
                log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual),
                log("B", ExerciseType::Running, at(9, 30), at(10, 0), LogOrigin::Synced),
                log("C", ExerciseType::Running, at(11, 0), at(11, 30), LogOrigin::Synced),
            ])
            .unwrap();

        assert!(result.iter().all(|log| !log.is_conflicting));
    }

    #[test]
    fn sync_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        let incoming = vec![
            log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Synced),
            log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced),
            log("C", ExerciseType::Yoga, at(9, 0), at(10, 0), LogOrigin::Synced),
        ];

        let first = reconciler.sync_and_detect_conflicts(&incoming).unwrap();
        let second = reconciler.sync_and_detect_conflicts(&incoming).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn sync_never_changes_times_or_type() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        let incoming = vec![
            log("A", ExerciseType::Hiking, at(6, 0), at(8, 0), LogOrigin::Synced),
            log("B", ExerciseType::Hiking, at(7, 0), at(9, 0), LogOrigin::Synced),
        ];
        let result = reconciler.sync_and_detect_conflicts(&incoming).unwrap();

        for (before, after) in incoming.iter().zip(&result) {
            assert_eq!(before.start_time, after.start_time);
            assert_eq!(before.end_time, after.end_time);
            assert_eq!(before.exercise_type, after.exercise_type);
        }
    }

    #[test]
    fn resolve_clears_exactly_one_flag() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        reconciler
            .sync_and_detect_conflicts(&[
                log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual),
                log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced),
                log("C", ExerciseType::Boxing, at(12, 0), at(13, 0), LogOrigin::Synced),
                log("D", ExerciseType::Boxing, at(12, 30), at(13, 30), LogOrigin::Synced),
            ])
            .unwrap();

        reconciler.resolve_conflict(&"A".into()).unwrap();

        assert_eq!(
            flags(&repo.get_all().unwrap()),
            vec![("A", false), ("B", true), ("C", true), ("D", true)]
        );
    }

    #[test]
    fn resolve_unknown_id_is_record_not_found() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        assert!(matches!(
            reconciler.resolve_conflict(&"nope".into()),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn delete_leaves_counterpart_flag_and_rejects_repeat() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        reconciler
            .sync_and_detect_conflicts(&[
                log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual),
                log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced),
            ])
            .unwrap();

        reconciler.delete_log(&"A".into()).unwrap();
        assert_eq!(flags(&repo.get_all().unwrap()), vec![("B", true)]);

        assert!(matches!(
            reconciler.delete_log(&"A".into()),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn resolved_log_is_flagged_again_by_next_sync_while_overlap_remains() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        reconciler
            .sync_and_detect_conflicts(&[
                log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual),
                log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced),
            ])
            .unwrap();
        reconciler.resolve_conflict(&"A".into()).unwrap();

        let result = reconciler.sync_and_detect_conflicts(&[]).unwrap();
        assert_eq!(flags(&result), vec![("A", true), ("B", true)]);
    }

    #[test]
    fn require_reports_missing_log() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteExerciseLogRepository::new(db.connection());
        let reconciler = LogReconciler::new(&repo);

        assert!(matches!(
            reconciler.require(&"nope".into()),
            Err(Error::RecordNotFound(_))
        ));
    }

    /// Store whose overlap query always fails, after accepting writes.
    struct FailingOverlapRepository<'a> {
        inner: SqliteExerciseLogRepository<'a>,
    }

    impl ExerciseLogRepository for FailingOverlapRepository<'_> {
        fn upsert_one(&self, log: &ExerciseLog) -> Result<()> {
            self.inner.upsert_one(log)
        }
        fn upsert_many(&self, logs: &[ExerciseLog]) -> Result<()> {
            self.inner.upsert_many(logs)
        }
        fn get_all(&self) -> Result<Vec<ExerciseLog>> {
            self.inner.get_all()
        }
        fn get_by_id(&self, id: &ExerciseLogId) -> Result<Option<ExerciseLog>> {
            self.inner.get_by_id(id)
        }
        fn delete_by_id(&self, id: &ExerciseLogId) -> Result<()> {
            self.inner.delete_by_id(id)
        }
        fn find_overlapping(&self) -> Result<Vec<ExerciseLog>> {
            Err(Error::StorageUnavailable("database is locked".into()))
        }
        fn set_conflict_flag(&self, id: &ExerciseLogId, is_conflicting: bool) -> Result<()> {
            self.inner.set_conflict_flag(id, is_conflicting)
        }
        fn list_by_day(&self, day: NaiveDate) -> Result<Vec<ExerciseLog>> {
            self.inner.list_by_day(day)
        }
        fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
            self.inner.list_ids_by_prefix(prefix, limit)
        }
    }

    #[test]
    fn failed_detection_propagates_and_keeps_unflagged_upserts() {
        let db = Database::open_in_memory().unwrap();
        let repo = FailingOverlapRepository {
            inner: SqliteExerciseLogRepository::new(db.connection()),
        };
        let reconciler = LogReconciler::new(&repo);

        let result = reconciler.sync_and_detect_conflicts(&[
            log("A", ExerciseType::Running, at(9, 0), at(9, 30), LogOrigin::Manual),
            log("B", ExerciseType::Running, at(9, 15), at(9, 45), LogOrigin::Synced),
        ]);

        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
        assert_eq!(
            flags(&repo.get_all().unwrap()),
            vec![("A", false), ("B", false)]
        );
    }
}
