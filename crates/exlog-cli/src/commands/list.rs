use std::path::Path;

use chrono::{Local, Utc};
use exlog_core::ExerciseLog;

use crate::commands::common::{
    format_day_lines, log_to_list_item, open_service, parse_day, LogListItem,
};
use crate::error::CliError;

pub async fn list_logs(
    day: Option<&str>,
    conflicts_only: bool,
    utc: bool,
    db_path: &Path,
) -> Result<Vec<ExerciseLog>, CliError> {
    let day = day.map(parse_day).transpose()?;
    let service = open_service(db_path).await?;

    let logs = match day {
        Some(day) if utc => service.list_logs_by_day(day).await?,
        _ if conflicts_only => service.list_conflicting_logs().await?,
        _ => service.list_logs().await?,
    };
    let on_requested_day = |log: &ExerciseLog| match day {
        Some(day) if !utc => log.start_time.with_timezone(&Local).date_naive() == day,
        _ => true,
    };

    Ok(logs
        .into_iter()
        .filter(|log| !conflicts_only || log.is_conflicting)
        .filter(on_requested_day)
        .collect())
}

pub async fn run_list(
    day: Option<&str>,
    conflicts_only: bool,
    utc: bool,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let logs = list_logs(day, conflicts_only, utc, db_path).await?;

    if as_json {
        let json_items = logs
            .iter()
            .map(log_to_list_item)
            .collect::<Vec<LogListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if logs.is_empty() {
        if conflicts_only {
            println!("No conflicting logs.");
        } else {
            println!("No exercise logs yet.");
        }
        return Ok(());
    }

    let lines = if utc {
        format_day_lines(logs, &Utc)
    } else {
        format_day_lines(logs, &Local)
    };
    for line in lines {
        println!("{line}");
    }

    Ok(())
}
