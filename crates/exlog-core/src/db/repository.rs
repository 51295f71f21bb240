//! Exercise log repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{ExerciseLog, ExerciseLogId, ExerciseType, LogOrigin};

const LOG_COLUMNS: &str = "id, exercise_type, start_time, end_time, duration_minutes, \
                           calories_burned, origin, is_conflicting";

/// Trait for exercise log storage operations
pub trait ExerciseLogRepository {
    /// Insert a log, replacing any stored log with the same id
    fn upsert_one(&self, log: &ExerciseLog) -> Result<()>;

    /// Insert or replace a batch of logs atomically
    fn upsert_many(&self, logs: &[ExerciseLog]) -> Result<()>;

    /// All stored logs, oldest start first
    fn get_all(&self) -> Result<Vec<ExerciseLog>>;

    /// Get a log by ID
    fn get_by_id(&self, id: &ExerciseLogId) -> Result<Option<ExerciseLog>>;

    /// Remove a log; `RecordNotFound` when nothing was deleted
    fn delete_by_id(&self, id: &ExerciseLogId) -> Result<()>;

    /// Every log that overlaps at least one other log of the same type
    fn find_overlapping(&self) -> Result<Vec<ExerciseLog>>;

    /// Set or clear the conflict flag of a single log
    fn set_conflict_flag(&self, id: &ExerciseLogId, is_conflicting: bool) -> Result<()>;

    /// Logs whose start falls on the given UTC calendar day
    fn list_by_day(&self, day: NaiveDate) -> Result<Vec<ExerciseLog>>;

    /// Ids starting with `prefix`, most recent start first
    fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;
}

/// `SQLite` implementation of `ExerciseLogRepository`
pub struct SqliteExerciseLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteExerciseLogRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn insert_or_replace(conn: &Connection, log: &ExerciseLog) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO exercise_logs
                (id, exercise_type, start_time, end_time, duration_minutes,
                 calories_burned, origin, is_conflicting)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                log.id.as_str(),
                log.exercise_type.as_str(),
                log.start_time.timestamp_millis(),
                log.end_time.timestamp_millis(),
                log.duration_minutes,
                log.calories_burned,
                log.origin.as_str(),
                i32::from(log.is_conflicting),
            ],
        )?;
        Ok(())
    }

    fn query_logs(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ExerciseLog>> {
        let mut stmt = self.conn.prepare(sql)?;
        let logs = stmt
            .query_map(params, Self::parse_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    /// Parse a log from a database row selected with `LOG_COLUMNS`
    fn parse_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExerciseLog> {
        let id: String = row.get(0)?;
        let exercise_type: String = row.get(1)?;
        let origin: String = row.get(6)?;

        Ok(ExerciseLog {
            id: ExerciseLogId::from(id.as_str()),
            exercise_type: exercise_type
                .parse::<ExerciseType>()
                .map_err(|error| conversion_error(1, error.into()))?,
            start_time: timestamp_column(row, 2)?,
            end_time: timestamp_column(row, 3)?,
            duration_minutes: row.get(4)?,
            calories_burned: row.get(5)?,
            origin: origin
                .parse::<LogOrigin>()
                .map_err(|error| conversion_error(6, Box::new(error)))?,
            is_conflicting: row.get::<_, i32>(7)? != 0,
        })
    }
}

fn timestamp_column(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(index)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        conversion_error(index, format!("timestamp out of range: {millis}").into())
    })
}

fn conversion_error(
    index: usize,
    error: Box<dyn std::error::Error + Send + Sync>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, error)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl ExerciseLogRepository for SqliteExerciseLogRepository<'_> {
    fn upsert_one(&self, log: &ExerciseLog) -> Result<()> {
        Self::insert_or_replace(self.conn, log)
    }

    fn upsert_many(&self, logs: &[ExerciseLog]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for log in logs {
            Self::insert_or_replace(&tx, log)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<ExerciseLog>> {
        self.query_logs(
            &format!("SELECT {LOG_COLUMNS} FROM exercise_logs ORDER BY start_time ASC, id ASC"),
            [],
        )
    }

    fn get_by_id(&self, id: &ExerciseLogId) -> Result<Option<ExerciseLog>> {
        let log = self
            .conn
            .query_row(
                &format!("SELECT {LOG_COLUMNS} FROM exercise_logs WHERE id = ?"),
                params![id.as_str()],
                Self::parse_log,
            )
            .optional()?;
        Ok(log)
    }

    fn delete_by_id(&self, id: &ExerciseLogId) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM exercise_logs WHERE id = ?",
            params![id.as_str()],
        )?;

        if rows == 0 {
            return Err(Error::RecordNotFound(id.to_string()));
        }

        Ok(())
    }

    fn find_overlapping(&self) -> Result<Vec<ExerciseLog>> {
        let columns = LOG_COLUMNS
            .split(", ")
            .map(|column| format!("a.{}", column.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        self.query_logs(
            &format!(
                "SELECT {columns}
                 FROM exercise_logs a
                 WHERE EXISTS (
                     SELECT 1 FROM exercise_logs b
                     WHERE b.id <> a.id
                       AND b.exercise_type = a.exercise_type
                       AND a.start_time < b.end_time
                       AND a.end_time > b.start_time
                 )
                 ORDER BY a.start_time ASC, a.id ASC"
            ),
            [],
        )
    }

    fn set_conflict_flag(&self, id: &ExerciseLogId, is_conflicting: bool) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE exercise_logs SET is_conflicting = ? WHERE id = ?",
            params![i32::from(is_conflicting), id.as_str()],
        )?;

        if rows == 0 {
            return Err(Error::RecordNotFound(id.to_string()));
        }

        Ok(())
    }

    fn list_by_day(&self, day: NaiveDate) -> Result<Vec<ExerciseLog>> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::InvalidInput(format!("day out of range: {day}")))?;

        self.query_logs(
            &format!(
                "SELECT {LOG_COLUMNS} FROM exercise_logs
                 WHERE start_time >= ? AND start_time < ?
                 ORDER BY start_time ASC, id ASC"
            ),
            params![start.timestamp_millis(), end.timestamp_millis()],
        )
    }

    fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM exercise_logs
             WHERE id LIKE ? ESCAPE '\\'
             ORDER BY start_time DESC
             LIMIT ?",
        )?;

        let ids = stmt
            .query_map(
                params![format!("{}%", escape_like(prefix)), limit as i64],
                |row| row.get::<_, String>(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()
    }

    fn log(id: &str, kind: ExerciseType, start: DateTime<Utc>, end: DateTime<Utc>) -> ExerciseLog {
        ExerciseLog::new(id.into(), kind, start, end, 150, LogOrigin::Manual).unwrap()
    }

    fn ids(logs: &[ExerciseLog]) -> Vec<&str> {
        logs.iter().map(|log| log.id.as_str()).collect()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        let entry = log("a", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30));
        repo.upsert_one(&entry).unwrap();

        let fetched = repo.get_by_id(&entry.id).unwrap().unwrap();
        assert_eq!(fetched, entry);
        assert!(repo.get_by_id(&"missing".into()).unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        let mut entry = log("a", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30));
        repo.upsert_one(&entry).unwrap();

        entry.calories_burned = 300;
        entry.is_conflicting = true;
        repo.upsert_one(&entry).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].calories_burned, 300);
        assert!(all[0].is_conflicting);
    }

    #[test]
    fn test_get_all_sorted_by_start() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        repo.upsert_many(&[
            log("late", ExerciseType::Walking, at(2, 18, 0), at(2, 18, 30)),
            log("early", ExerciseType::Walking, at(1, 7, 0), at(1, 7, 30)),
            log("mid", ExerciseType::Yoga, at(1, 12, 0), at(1, 13, 0)),
        ])
        .unwrap();

        assert_eq!(ids(&repo.get_all().unwrap()), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_delete() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        let entry = log("a", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30));
        repo.upsert_one(&entry).unwrap();
        repo.delete_by_id(&entry.id).unwrap();

        assert!(repo.get_all().unwrap().is_empty());
        assert!(matches!(
            repo.delete_by_id(&entry.id),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_set_conflict_flag() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        let entry = log("a", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30));
        repo.upsert_one(&entry).unwrap();

        repo.set_conflict_flag(&entry.id, true).unwrap();
        assert!(repo.get_by_id(&entry.id).unwrap().unwrap().is_conflicting);

        repo.set_conflict_flag(&entry.id, false).unwrap();
        assert!(!repo.get_by_id(&entry.id).unwrap().unwrap().is_conflicting);

        assert!(matches!(
            repo.set_conflict_flag(&"missing".into(), true),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_find_overlapping() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        repo.upsert_many(&[
            log("run-a", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30)),
            log("run-b", ExerciseType::Running, at(1, 9, 15), at(1, 9, 45)),
            log("run-c", ExerciseType::Running, at(1, 9, 45), at(1, 10, 0)),
            log("box-a", ExerciseType::Boxing, at(1, 9, 0), at(1, 9, 30)),
        ])
        .unwrap();

        assert_eq!(ids(&repo.find_overlapping().unwrap()), vec!["run-a", "run-b"]);
    }

    #[test]
    fn test_list_by_day() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        repo.upsert_many(&[
            log("first", ExerciseType::Running, at(1, 0, 0), at(1, 0, 30)),
            log("second", ExerciseType::Running, at(1, 23, 50), at(2, 0, 20)),
            log("next-day", ExerciseType::Running, at(2, 0, 30), at(2, 1, 0)),
        ])
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(ids(&repo.list_by_day(day).unwrap()), vec!["first", "second"]);
    }

    #[test]
    fn test_list_ids_by_prefix_escapes_wildcards() {
        let db = setup();
        let repo = SqliteExerciseLogRepository::new(db.connection());

        repo.upsert_many(&[
            log("abc-1", ExerciseType::Running, at(1, 9, 0), at(1, 9, 30)),
            log("abc-2", ExerciseType::Running, at(2, 9, 0), at(2, 9, 30)),
            log("a_cd", ExerciseType::Running, at(3, 9, 0), at(3, 9, 30)),
        ])
        .unwrap();

        assert_eq!(repo.list_ids_by_prefix("abc", 10).unwrap(), vec!["abc-2", "abc-1"]);
        assert_eq!(repo.list_ids_by_prefix("a_", 10).unwrap(), vec!["a_cd"]);
        assert_eq!(repo.list_ids_by_prefix("abc", 1).unwrap().len(), 1);
    }
}
