//! Sync cursor repository implementation

use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::SyncCursor;

const LAST_SYNCED_AT_KEY: &str = "last_synced_at";
const CHANGES_TOKEN_KEY: &str = "changes_token";

/// Trait for persisting the health sync cursor
pub trait SyncStateRepository {
    /// Load the cursor; missing or unreadable values come back as `None`
    fn load_cursor(&self) -> Result<SyncCursor>;

    /// Save the cursor, removing keys whose value is `None`
    fn save_cursor(&self, cursor: &SyncCursor) -> Result<()>;

    /// Forget all sync progress
    fn clear_cursor(&self) -> Result<()>;
}

/// `SQLite` implementation of `SyncStateRepository`
pub struct SqliteSyncStateRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncStateRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM sync_state WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_value(conn: &Connection, key: &str, value: Option<String>) -> Result<()> {
        if let Some(value) = value {
            conn.execute(
                "INSERT OR REPLACE INTO sync_state (key, value) VALUES (?, ?)",
                params![key, value],
            )?;
        } else {
            conn.execute("DELETE FROM sync_state WHERE key = ?", params![key])?;
        }
        Ok(())
    }
}

impl SyncStateRepository for SqliteSyncStateRepository<'_> {
    fn load_cursor(&self) -> Result<SyncCursor> {
        let last_synced_at = self
            .get_value(LAST_SYNCED_AT_KEY)?
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);

        let changes_token = match self.get_value(CHANGES_TOKEN_KEY)? {
            Some(value) => match value.parse() {
                Ok(token) => Some(token),
                Err(error) => {
                    tracing::warn!("Discarding unreadable change token: {error}");
                    None
                }
            },
            None => None,
        };

        Ok(SyncCursor {
            last_synced_at,
            changes_token,
        })
    }

    fn save_cursor(&self, cursor: &SyncCursor) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::set_value(
            &tx,
            LAST_SYNCED_AT_KEY,
            cursor
                .last_synced_at
                .map(|time| time.timestamp_millis().to_string()),
        )?;
        Self::set_value(
            &tx,
            CHANGES_TOKEN_KEY,
            cursor.changes_token.map(|token| token.to_string()),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn clear_cursor(&self) -> Result<()> {
        self.conn.execute("DELETE FROM sync_state", [])?;
        Ok(())
    }
}
