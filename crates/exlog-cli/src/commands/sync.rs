use std::path::Path;

use chrono::{DateTime, Utc};
use exlog_core::config::SyncOptions;
use exlog_core::health::JsonExportSource;
use exlog_core::models::SyncCursor;
use exlog_core::sync::{HealthSync, SyncReport};
use serde::Serialize;

use crate::commands::common::open_service;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct SyncSummaryItem {
    pub windowed: usize,
    pub changed: usize,
    pub conflicting: usize,
    pub full_reread: bool,
    pub window_start: String,
    pub total_logs: usize,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusItem {
    pub last_synced_at: Option<String>,
    pub changes_token: Option<String>,
}

pub fn sync_summary_item(report: &SyncReport) -> SyncSummaryItem {
    SyncSummaryItem {
        windowed: report.windowed,
        changed: report.changed,
        conflicting: report.conflicting,
        full_reread: report.full_reread,
        window_start: report.window_start.to_rfc3339(),
        total_logs: report.logs.len(),
    }
}

pub fn sync_status_item(cursor: &SyncCursor) -> SyncStatusItem {
    SyncStatusItem {
        last_synced_at: cursor.last_synced_at.map(|time| time.to_rfc3339()),
        changes_token: cursor.changes_token.map(|token| token.to_string()),
    }
}

pub fn format_sync_summary(report: &SyncReport) -> String {
    let mut summary = format!(
        "Sync completed: {} new, {} updated, {} conflicting",
        report.windowed, report.changed, report.conflicting
    );
    if report.full_reread {
        summary.push_str(" (change history expired; re-read recent sessions)");
    }
    summary
}

pub async fn sync_from_export(
    source_path: Option<&Path>,
    options: SyncOptions,
    now: DateTime<Utc>,
    db_path: &Path,
) -> Result<SyncReport, CliError> {
    let source_path = source_path.ok_or(CliError::HealthSourceNotConfigured)?;
    let source = JsonExportSource::load(source_path, options.token_ttl())?;
    let service = open_service(db_path).await?;

    Ok(HealthSync::new(options).run(&source, &service, now).await?)
}

pub async fn run_sync(
    source_path: Option<&Path>,
    options: SyncOptions,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let report = sync_from_export(source_path, options, Utc::now(), db_path).await?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&sync_summary_item(&report))?
        );
    } else {
        println!("{}", format_sync_summary(&report));
    }
    Ok(())
}

pub async fn run_sync_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let cursor = service.load_sync_cursor().await?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&sync_status_item(&cursor))?
        );
        return Ok(());
    }

    if let Some(path) = service.db_path() {
        println!("Database: {}", path.display());
    }
    match cursor.last_synced_at {
        Some(time) => println!(
            "Last synced: {}",
            time.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Never synced."),
    }
    if let Some(token) = cursor.changes_token {
        println!("Change feed position: {}", token.position());
    }
    Ok(())
}

pub async fn run_sync_reset(db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    service.reset_sync_cursor().await?;
    println!("Sync progress cleared");
    Ok(())
}
