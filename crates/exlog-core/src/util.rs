//! Shared utility functions used across clients.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::ExerciseLog;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
#[must_use]
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Human-readable duration: "45 min" under an hour, "1h 5m" from an hour on.
#[must_use]
pub fn format_duration_minutes(minutes: i64) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Date and time range in the given zone, e.g. "May 1, 2024 | 9:00 AM - 9:45 AM".
#[must_use]
pub fn format_time_range<Tz: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let start = start.with_timezone(tz);
    let end = end.with_timezone(tz);
    format!(
        "{} | {} - {}",
        start.format("%b %-d, %Y"),
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p")
    )
}

/// Group logs by the calendar day of their start in the given zone.
///
/// Days are ordered oldest first; logs keep their incoming order within a day.
#[must_use]
pub fn group_by_day<Tz: TimeZone>(
    logs: Vec<ExerciseLog>,
    tz: &Tz,
) -> Vec<(NaiveDate, Vec<ExerciseLog>)> {
    let mut days: BTreeMap<NaiveDate, Vec<ExerciseLog>> = BTreeMap::new();
    for log in logs {
        let day = log.start_time.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(log);
    }
    days.into_iter().collect()
}
