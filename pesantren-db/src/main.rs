use pesantren_db::config::AppConfig;
use pesantren_db::settings::Settings;
use pesantren_db::storage::{StorageError, Store};
mod cli;

use cli::{Command, SettingsCommand};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = cli::Cli::parse();

    // Console-only logging with env-driven level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error=%e, "Failed to load config");
            std::process::exit(2);
        }
    };
    if let Some(db) = args.db {
        config.database.path = db;
    }

    // Migration commands manage the schema themselves
    if matches!(
        args.command,
        Command::Migrate | Command::Rollback { .. } | Command::Status
    ) {
        config.database.auto_migrate = false;
    }

    if let Some(parent) = std::path::Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = match Store::connect(&config.database).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, path=%config.database.path, "Failed to connect DB");
            std::process::exit(3);
        }
    };

    if let Err(e) = run(args.command, store, config).await {
        tracing::error!(error=%e, "Command failed");
        std::process::exit(4);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig, pesantren_db::config::ConfigError> {
    match path {
        Some(p) => {
            let mut cfg = AppConfig::load_from_path(p)?;
            if let Ok(db_path) = std::env::var("DB_PATH") {
                cfg.database.path = db_path;
            }
            Ok(cfg)
        }
        None => AppConfig::load(),
    }
}

async fn run(command: Command, store: Store, config: AppConfig) -> Result<(), StorageError> {
    match command {
        Command::Migrate => {
            let applied = store.run_pending_migrations().await?;
            if applied.is_empty() {
                println!("schema up to date");
            }
            for version in applied {
                println!("applied {version}");
            }
        }
        Command::Rollback { all } => {
            if all {
                for version in store.revert_all_migrations().await? {
                    println!("reverted {version}");
                }
            } else {
                let version = store.revert_last_migration().await?;
                println!("reverted {version}");
            }
        }
        Command::Status => {
            for version in store.applied_migrations().await? {
                println!("applied  {version}");
            }
            for name in store.pending_migrations().await? {
                println!("pending  {name}");
            }
        }
        Command::RefreshLatestAttendance => {
            let rows = store.refresh_latest_attendance().await?;
            println!("{rows} students");
        }
        Command::Search {
            scope,
            query,
            limit,
        } => {
            let hits = store.search(scope.into(), &query, limit).await?;
            println!("{}", to_json(&hits)?);
        }
        Command::Reindex { scope } => {
            let rows = store.rebuild_search_index(scope.into()).await?;
            println!("{rows} documents indexed");
        }
        Command::Settings { action } => {
            let settings = Settings::new(store, config.settings);
            match action {
                SettingsCommand::Get { key } => match settings.get(&key).await? {
                    Some(value) => println!("{}", to_json(&value)?),
                    None => {
                        return Err(StorageError::InvalidInput(format!(
                            "no value or default for {key}"
                        )));
                    }
                },
                SettingsCommand::Set { key, value } => {
                    let value: serde_json::Value = serde_json::from_str(&value).map_err(|e| {
                        StorageError::InvalidInput(format!("value is not JSON: {e}"))
                    })?;
                    settings.set(&key, value).await?;
                }
                SettingsCommand::Init => {
                    let written = settings.init().await?;
                    println!("{written} defaults written");
                }
            }
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string_pretty(value).map_err(|e| StorageError::InvalidInput(e.to_string()))
}
