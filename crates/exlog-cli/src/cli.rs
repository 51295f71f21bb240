use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "exlog")]
#[command(about = "Log workouts and reconcile them with synced health data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a workout by hand
    #[command(alias = "new")]
    Add(AddArgs),
    /// List logged workouts by day
    List {
        /// Only show one day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        day: Option<String>,
        /// Only show conflicting logs
        #[arg(long)]
        conflicts: bool,
        /// Group by UTC day instead of local day
        #[arg(long)]
        utc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep a conflicting log and clear its conflict flag
    #[command(alias = "resolve")]
    Keep {
        /// Log ID or unique ID prefix
        id: String,
    },
    /// Delete a log
    Delete {
        /// Log ID or unique ID prefix
        id: String,
    },
    /// Pull sessions from a health data export
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
        /// Health export file (JSON)
        #[arg(long, value_name = "PATH")]
        source: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known exercise types
    Types,
    /// Manage the CLI config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Exercise type, e.g. running or "strength training"
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub exercise_type: String,
    /// Start time: RFC 3339, "YYYY-MM-DD HH:MM" or "HH:MM" (local); defaults
    /// to ending now
    #[arg(long, value_name = "TIME")]
    pub start: Option<String>,
    /// Duration hours
    #[arg(long, default_value_t = 0)]
    pub hours: i64,
    /// Duration minutes
    #[arg(long, default_value_t = 0)]
    pub minutes: i64,
    /// Calories burned
    #[arg(long, default_value_t = 0)]
    pub calories: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show the stored sync cursor
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget sync progress; the next sync re-reads the lookback window
    Reset,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init {
        /// Database file to use by default
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
        /// Health export file to sync from by default
        #[arg(long, value_name = "PATH")]
        health_export: Option<PathBuf>,
        /// Days read back on a first sync
        #[arg(long, value_name = "DAYS")]
        lookback_days: Option<u32>,
    },
    /// Print the config file location and contents
    Show,
}
