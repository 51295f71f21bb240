use std::path::Path;

use crate::commands::common::{open_service, resolve_log};
use crate::error::CliError;

pub async fn run_keep(id: &str, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let log = resolve_log(id, &service).await?;

    if !log.is_conflicting {
        tracing::debug!("Log {} was not flagged", log.id);
    }
    service.resolve_conflict(&log.id).await?;
    println!("{}", log.id);
    Ok(())
}
