//! exlog CLI - log workouts from the terminal and reconcile them with
//! sessions pulled from a health data export.

mod cli;
mod commands;
mod config;
mod error;


use chrono::Local;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommands, SyncCommands};
use crate::commands::add::run_add;
use crate::commands::completions::run_completions;
use crate::commands::config::{run_config_init, run_config_show};
use crate::commands::delete::run_delete;
use crate::commands::keep::run_keep;
use crate::commands::list::run_list;
use crate::commands::sync::{run_sync, run_sync_reset, run_sync_status};
use crate::commands::types::run_types;
use crate::config::CliConfig;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("exlog=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load().map_err(CliError::Config)?;
    let db_path = || config.resolve_db_path(cli.db_path.clone()).map_err(CliError::Config);

    match cli.command {
        Some(Commands::Add(ref args)) => {
            run_add(args, &Local::now(), &db_path()?).await?;
        }
        Some(Commands::List {
            ref day,
            conflicts,
            utc,
            json,
        }) => {
            run_list(day.as_deref(), conflicts, utc, json, &db_path()?).await?;
        }
        Some(Commands::Keep { ref id }) => run_keep(id, &db_path()?).await?,
        Some(Commands::Delete { ref id }) => run_delete(id, &db_path()?).await?,
        Some(Commands::Sync {
            command: Some(SyncCommands::Status { json }),
            ..
        }) => run_sync_status(json, &db_path()?).await?,
        Some(Commands::Sync {
            command: Some(SyncCommands::Reset),
            ..
        }) => run_sync_reset(&db_path()?).await?,
        Some(Commands::Sync {
            command: None,
            ref source,
            json,
        }) => {
            let source = config.resolve_health_export_path(source.clone());
            run_sync(source.as_deref(), config.sync_options(), json, &db_path()?).await?;
        }
        Some(Commands::Types) => run_types(),
        Some(Commands::Config {
            command:
                ConfigCommands::Init {
                    ref database,
                    ref health_export,
                    lookback_days,
                },
        }) => run_config_init(database.clone(), health_export.clone(), lookback_days)?,
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => run_config_show()?,
        Some(Commands::Completions { shell, ref output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
