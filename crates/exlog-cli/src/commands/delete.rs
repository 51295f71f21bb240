use std::path::Path;

use crate::commands::common::{open_service, resolve_log};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let log = resolve_log(id, &service).await?;

    service.delete_log(&log.id).await?;
    println!("{}", log.id);
    Ok(())
}
