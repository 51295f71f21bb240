//! Health sync cursor model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const TOKEN_PREFIX: &str = "v1";

/// Opaque continuation token for the health source's change feed.
///
/// Encodes the feed position and the time it was issued so that expiry can be
/// checked without asking the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChangeToken {
    position: u64,
    issued_at: DateTime<Utc>,
}

impl ChangeToken {
    #[must_use]
    pub const fn new(position: u64, issued_at: DateTime<Utc>) -> Self {
        Self {
            position,
            issued_at,
        }
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Whether the token is older than the source's validity window
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TOKEN_PREFIX}:{}:{}",
            self.position,
            self.issued_at.timestamp_millis()
        )
    }
}

impl FromStr for ChangeToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("malformed change token: {s}"));

        let mut parts = s.trim().split(':');
        if parts.next() != Some(TOKEN_PREFIX) {
            return Err(invalid());
        }
        let position = parts
            .next()
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or_else(invalid)?;
        let issued_at = parts
            .next()
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(position, issued_at))
    }
}

impl TryFrom<String> for ChangeToken {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ChangeToken> for String {
    fn from(value: ChangeToken) -> Self {
        value.to_string()
    }
}

/// Persisted position of the health sync: where the next windowed read
/// starts and where the change feed resumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// End of the last successful read window
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Change feed position acknowledged by the last successful pass
    pub changes_token: Option<ChangeToken>,
}

impl SyncCursor {
    /// Start of the next read window; `lookback` applies on the first sync.
    pub fn window_start(&self, now: DateTime<Utc>, lookback: Duration) -> Result<DateTime<Utc>> {
        match self.last_synced_at {
            Some(last_synced_at) => Ok(last_synced_at),
            None => lookback_start(now, lookback),
        }
    }
}

/// `now - lookback`, or `InvalidInput` when that falls outside the calendar.
pub fn lookback_start(now: DateTime<Utc>, lookback: Duration) -> Result<DateTime<Utc>> {
    now.checked_sub_signed(lookback).ok_or_else(|| {
        Error::InvalidInput(format!(
            "lookback of {} days is out of range",
            lookback.num_days()
        ))
    })
}
