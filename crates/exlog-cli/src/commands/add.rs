use std::path::Path;

use chrono::{DateTime, TimeZone};
use exlog_core::{ExerciseLog, NewExerciseLog};

use crate::cli::AddArgs;
use crate::commands::common::{open_service, parse_exercise_type, parse_start_time, short_id};
use crate::error::CliError;

pub async fn run_add<Tz: TimeZone>(
    args: &AddArgs,
    now: &DateTime<Tz>,
    db_path: &Path,
) -> Result<ExerciseLog, CliError> {
    let exercise_type = parse_exercise_type(&args.exercise_type)?;
    let duration_minutes = args
        .hours
        .checked_mul(60)
        .and_then(|minutes| minutes.checked_add(args.minutes))
        .filter(|minutes| *minutes > 0)
        .ok_or(CliError::InvalidDuration)?;
    let start_time = parse_start_time(args.start.as_deref(), now, duration_minutes)?;

    let entry = NewExerciseLog::new(exercise_type, start_time)
        .with_duration(args.hours, args.minutes)
        .with_calories(args.calories);

    let service = open_service(db_path).await?;
    let log = service.add_log(entry).await?;

    println!("{}", log.id);
    if log.is_conflicting {
        let overlapping = service
            .list_logs()
            .await?
            .iter()
            .filter(|other| log.conflicts_with(other))
            .map(|other| short_id(other.id.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        eprintln!(
            "Warning: overlaps {} log {overlapping}. Review with `exlog list --conflicts`.",
            log.exercise_type.label().to_lowercase()
        );
    }
    Ok(log)
}
