pub mod activity;
pub mod aggregate;
pub mod attendance;
pub mod billing;
pub mod catalog;
pub mod content;
pub mod discipline;
pub mod document;
pub mod models;
pub mod people;
pub mod schema;
pub mod search;
pub mod students;

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::DatabaseErrorKind;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, trace};

use crate::config::DatabaseConfig;

pub use document::{Document, Json};

/// Every table-creation migration, in dependency order.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Which integrity rule the engine refused to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Duplicate primary key or unique column.
    Unique,
    /// Reference to a row that does not exist.
    ForeignKey,
    NotNull,
    Check,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
        };
        f.write_str(s)
    }
}

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The write violated a declared constraint. Never retried.
    #[error("{kind} constraint violation: {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },

    /// Any other Diesel error (query failure, deserialization, ...).
    #[error("database error: {0}")]
    Database(diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply or revert.
    #[error("migration error: {0}")]
    Migration(String),

    /// The caller supplied invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            StorageError::ConstraintViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for StorageError {
    fn from(err: diesel::result::Error) -> Self {
        if let diesel::result::Error::DatabaseError(kind, info) = &err {
            let kind = match kind {
                DatabaseErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                DatabaseErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                DatabaseErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                DatabaseErrorKind::CheckViolation => Some(ConstraintKind::Check),
                _ => None,
            };
            if let Some(kind) = kind {
                return StorageError::ConstraintViolation {
                    kind,
                    message: info.message().to_string(),
                };
            }
        }
        StorageError::Database(err)
    }
}

/// Applies the per-connection PRAGMAs once, when r2d2 opens a connection.
#[derive(Debug, Clone, Copy)]
struct SqliteCustomizer {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        configure_sqlite_conn(conn, self.busy_timeout_ms)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    /// Open `path` with default pool settings and apply pending migrations.
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let cfg = DatabaseConfig {
            path: path.to_string(),
            ..DatabaseConfig::default()
        };
        Self::connect(&cfg).await
    }

    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, StorageError> {
        if cfg.pool_size == 0 {
            return Err(StorageError::InvalidInput(
                "pool_size must be at least 1".to_string(),
            ));
        }
        let manager = ConnectionManager::<SqliteConnection>::new(cfg.path.clone());
        let pool = Pool::builder()
            .max_size(cfg.pool_size)
            .connection_customizer(Box::new(SqliteCustomizer {
                busy_timeout_ms: cfg.busy_timeout_ms,
            }))
            .build(manager)?;
        let store = Store { pool };
        debug!(path = %cfg.path, pool_size = cfg.pool_size, "storage pool ready");

        // Auto-init empty databases unless the caller wants to drive migrations
        if cfg.auto_migrate {
            store.run_pending_migrations().await?;
        }
        Ok(store)
    }

    /// Run `f` against a pooled connection on the blocking thread pool.
    pub(crate) async fn interact<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }

    /// Apply every migration not yet recorded. Returns the versions applied now.
    pub async fn run_pending_migrations(&self) -> Result<Vec<String>, StorageError> {
        let applied = self
            .interact(|conn| {
                let versions = conn
                    .run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(versions.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            })
            .await?;
        if applied.is_empty() {
            debug!("schema up to date");
        } else {
            info!(count = applied.len(), "applied migrations");
        }
        Ok(applied)
    }

    /// Tear the schema down in reverse dependency order. Newest version first.
    pub async fn revert_all_migrations(&self) -> Result<Vec<String>, StorageError> {
        let reverted = self
            .interact(|conn| {
                let versions = conn
                    .revert_all_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(versions.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            })
            .await?;
        info!(count = reverted.len(), "reverted migrations");
        Ok(reverted)
    }

    pub async fn revert_last_migration(&self) -> Result<String, StorageError> {
        let version = self
            .interact(|conn| {
                let version = conn
                    .revert_last_migration(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(version.to_string())
            })
            .await?;
        info!(%version, "reverted migration");
        Ok(version)
    }

    pub async fn applied_migrations(&self) -> Result<Vec<String>, StorageError> {
        self.interact(|conn| {
            let versions = conn
                .applied_migrations()
                .map_err(|e| StorageError::Migration(e.to_string()))?;
            Ok(versions.iter().map(|v| v.to_string()).collect())
        })
        .await
    }

    pub async fn pending_migrations(&self) -> Result<Vec<String>, StorageError> {
        self.interact(|conn| {
            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| StorageError::Migration(e.to_string()))?;
            Ok(pending.iter().map(|m| m.name().to_string()).collect())
        })
        .await
    }
}

/// Wall clock in epoch milliseconds, the timestamp unit of every table.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn configure_sqlite_conn(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u32,
) -> Result<(), diesel::result::Error> {
    trace!("configuring sqlite connection");
    // Connections opened together by the pool race on the WAL switch
    diesel::sql_query(format!("PRAGMA busy_timeout={busy_timeout_ms};")).execute(conn)?;
    // SQLite ships with referential actions off; every connection must opt in
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::BigInt;

    #[derive(QueryableByName)]
    struct ForeignKeys {
        #[diesel(sql_type = BigInt)]
        foreign_keys: i64,
    }

    #[derive(QueryableByName)]
    struct BusyTimeout {
        #[diesel(sql_type = BigInt)]
        timeout: i64,
    }

    #[tokio::test]
    async fn pooled_connections_are_configured_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = DatabaseConfig {
            path: dir.path().join("pragma.db").to_string_lossy().into_owned(),
            pool_size: 2,
            busy_timeout_ms: 1234,
            auto_migrate: false,
        };
        let store = Store::connect(&cfg).await.unwrap();

        for _ in 0..3 {
            let (fk, timeout) = store
                .interact(|conn| {
                    let fk = diesel::sql_query("PRAGMA foreign_keys")
                        .get_result::<ForeignKeys>(conn)?;
                    let busy = diesel::sql_query("PRAGMA busy_timeout")
                        .get_result::<BusyTimeout>(conn)?;
                    Ok((fk.foreign_keys, busy.timeout))
                })
                .await
                .unwrap();
            assert_eq!(fk, 1);
            assert_eq!(timeout, 1234);
        }
    }
}
