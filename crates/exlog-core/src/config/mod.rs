//! Health sync tuning.
//!
//! `SyncOptions` is shared by every client that drives a health sync; the CLI
//! fills it from its config file.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Days read back on the first sync or after the change feed expired
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Days a change token stays valid at the health source
pub const DEFAULT_TOKEN_TTL_DAYS: u32 = 30;

/// Options for a health sync pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncOptions {
    pub lookback_days: u32,
    pub token_ttl_days: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
        }
    }
}

impl SyncOptions {
    /// Replace the lookback; zero falls back to the default
    #[must_use]
    pub const fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = if days == 0 {
            DEFAULT_LOOKBACK_DAYS
        } else {
            days
        };
        self
    }

    #[must_use]
    pub fn lookback(&self) -> Duration {
        Duration::days(i64::from(self.lookback_days))
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::days(i64::from(self.token_ttl_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let options = SyncOptions::default();
        assert_eq!(options.lookback(), Duration::days(7));
        assert_eq!(options.token_ttl(), Duration::days(30));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let options: SyncOptions = serde_json::from_str(r#"{"lookback_days": 3}"#).unwrap();
        assert_eq!(options.lookback_days, 3);
        assert_eq!(options.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);
    }

    #[test]
    fn zero_lookback_keeps_default() {
        assert_eq!(
            SyncOptions::default().with_lookback_days(0).lookback_days,
            DEFAULT_LOOKBACK_DAYS
        );
        assert_eq!(SyncOptions::default().with_lookback_days(14).lookback_days, 14);
    }
}
