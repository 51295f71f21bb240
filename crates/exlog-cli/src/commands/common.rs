use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use exlog_core::services::LogService;
use exlog_core::util::{format_duration_minutes, format_time_range, group_by_day};
use exlog_core::{ExerciseLog, ExerciseLogId, ExerciseType};
use serde::Serialize;

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LogListItem {
    pub id: String,
    pub exercise_type: String,
    pub label: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub duration: String,
    pub calories_burned: u32,
    pub origin: String,
    pub is_conflicting: bool,
}

pub async fn open_service(path: &Path) -> Result<LogService, CliError> {
    Ok(LogService::open_path(path).await?)
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn normalize_log_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyLogId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find a log by exact id, falling back to a unique id prefix.
pub async fn resolve_log(query: &str, service: &LogService) -> Result<ExerciseLog, CliError> {
    let query = normalize_log_identifier(query)?;
    let exact = ExerciseLogId::from(query.as_str());
    if let Some(log) = service.get_log(&exact).await? {
        return Ok(log);
    }

    let matching_ids = service.list_log_ids_by_prefix(&query, 3).await?;

    match matching_ids.as_slice() {
        [] => Err(CliError::LogNotFound(query)),
        [only] => service
            .get_log(&ExerciseLogId::from(only.as_str()))
            .await?
            .ok_or(CliError::LogNotFound(query)),
        many => {
            let options = many
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousLogId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn parse_exercise_type(raw: &str) -> Result<ExerciseType, CliError> {
    raw.parse::<ExerciseType>()
        .map_err(|_| CliError::UnknownExerciseType(raw.trim().to_string()))
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDate(raw.trim().to_string()))
}

/// Resolve a start time given on the command line.
///
/// Accepts RFC 3339, a local "YYYY-MM-DD HH:MM", or a local "HH:MM" on the day
/// of `now`. Without a value the session is taken to end at `now`.
pub fn parse_start_time<Tz: TimeZone>(
    raw: Option<&str>,
    now: &DateTime<Tz>,
    duration_minutes: i64,
) -> Result<DateTime<Utc>, CliError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Duration::try_minutes(duration_minutes)
            .and_then(|duration| now.with_timezone(&Utc).checked_sub_signed(duration))
            .ok_or(CliError::InvalidDuration);
    };
    let invalid = || CliError::InvalidTime(raw.to_string());

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveTime::parse_from_str(raw, "%H:%M")
                .map(|time| now.date_naive().and_time(time))
        })
        .map_err(|_| invalid())?;

    now.timezone()
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid)
}

pub fn log_to_list_item(log: &ExerciseLog) -> LogListItem {
    LogListItem {
        id: log.id.to_string(),
        exercise_type: log.exercise_type.as_str().to_string(),
        label: log.exercise_type.label(),
        start_time: log.start_time.to_rfc3339(),
        end_time: log.end_time.to_rfc3339(),
        duration_minutes: log.duration_minutes,
        duration: format_duration_minutes(log.duration_minutes),
        calories_burned: log.calories_burned,
        origin: log.origin.as_str().to_string(),
        is_conflicting: log.is_conflicting,
    }
}

pub fn format_log_line<Tz: TimeZone>(log: &ExerciseLog, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let line = format!(
        "{:<13}  {:<22}  {}  {:>8}  {:>5} kcal  {}",
        short_id(log.id.as_str()),
        log.exercise_type.label(),
        format_time_range(log.start_time, log.end_time, tz),
        format_duration_minutes(log.duration_minutes),
        log.calories_burned,
        log.origin.as_str(),
    );
    if log.is_conflicting {
        format!("{line}  [conflict]")
    } else {
        line
    }
}

/// Day headers followed by indented log lines, oldest day first.
pub fn format_day_lines<Tz: TimeZone>(logs: Vec<ExerciseLog>, tz: &Tz) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut lines = Vec::new();
    for (day, logs) in group_by_day(logs, tz) {
        lines.push(day.format("%a, %b %-d %Y").to_string());
        lines.extend(
            logs.iter()
                .map(|log| format!("  {}", format_log_line(log, tz))),
        );
    }
    lines
}
