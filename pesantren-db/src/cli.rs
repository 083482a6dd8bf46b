use clap::{Parser, Subcommand, ValueEnum};
use pesantren_db::storage::search::SearchScope;
use std::path::PathBuf;

const HELP_EPILOG: &str = r#"Options can also be provided via environment variables:
  CONFIG_PATH (default: ./config.yaml, a missing file means built-in defaults)
  DB_PATH     (default: data/pesantren.db or config database.path)
  RUST_LOG    (default: info)

Command line flags take precedence over environment variables.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "pesantren-db",
    version,
    about = "Pesantren database schema and maintenance tool",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// SQLite database path, overrides config and DB_PATH
    #[arg(long, global = true)]
    pub db: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply all pending migrations
    Migrate,
    /// Revert the newest migration, or all of them
    Rollback {
        #[arg(long)]
        all: bool,
    },
    /// List applied and pending migrations
    Status,
    /// Rebuild the latest-attendance snapshot
    RefreshLatestAttendance,
    /// Full-text search over pages or news
    Search {
        scope: ScopeArg,
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Rebuild a search index from its base table
    Reindex { scope: ScopeArg },
    /// Read or write application settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the effective value of a key as JSON
    Get { key: String },
    /// Store a JSON value under a key
    Set { key: String, value: String },
    /// Write configured defaults for keys that have no row yet
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Pages,
    News,
}

impl From<ScopeArg> for SearchScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Pages => SearchScope::Pages,
            ScopeArg::News => SearchScope::News,
        }
    }
}
