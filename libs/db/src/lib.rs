//! Database handle shared by the server and its tests.
//!
//! `DbHandle` detects the engine from the DSN (SQLite or PostgreSQL), builds
//! the sqlx pool with sane defaults, and wraps it into a SeaORM
//! [`DatabaseConnection`] for the rest of the codebase. SQLite connections
//! get WAL journaling, NORMAL synchronous and a busy timeout applied per
//! connection.

use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{PgPool, SqlitePool};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

impl DbEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbEngine::Postgres => "postgres",
            DbEngine::Sqlite => "sqlite",
        }
    }
}

/// Connection options. Each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// SQLite-specific: busy timeout applied via PRAGMA busy_timeout.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// One concrete sqlx pool.
#[derive(Clone)]
enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Main handle: sqlx pool plus the SeaORM connection wrapping it.
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN.
    ///
    /// Only checks scheme prefixes; the tail (credentials etc.) is left alone.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        // Trim only leading whitespace to be forgiving with env files.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build the handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        match engine {
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                tracing::debug!(engine = "postgres", "database pool ready");
                Ok(Self {
                    engine,
                    pool: DbPool::Postgres(pool),
                    sea,
                })
            }
            DbEngine::Sqlite => {
                let dsn = prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?;
                let mut o = SqlitePoolOptions::new();

                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }

                // An in-memory database lives and dies with its connection;
                // keep exactly one so every query sees the same schema.
                if is_sqlite_memory(&dsn) {
                    o = o
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                }

                // Copy busy timeout into the closure (per-connection PRAGMAs).
                let busy = opts.sqlite_busy_timeout;
                o = o.after_connect(move |conn, _meta| {
                    Box::pin(async move {
                        sqlx::query("PRAGMA journal_mode = WAL")
                            .execute(&mut *conn)
                            .await?;

                        sqlx::query("PRAGMA synchronous = NORMAL")
                            .execute(&mut *conn)
                            .await?;

                        if let Some(ms) = busy {
                            // PRAGMA can't use bind parameters; use a numeric literal.
                            let ms = std::cmp::min(ms.as_millis(), i64::MAX as u128) as i64;
                            let stmt = format!("PRAGMA busy_timeout = {ms}");
                            sqlx::query(&stmt).execute(&mut *conn).await?;
                        }

                        Ok(())
                    })
                });

                let pool = o.connect(&dsn).await?;
                let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                tracing::debug!(engine = "sqlite", "database pool ready");

                Ok(Self {
                    engine,
                    pool: DbPool::Sqlite(pool),
                    sea,
                })
            }
        }
    }

    /// Graceful pool close. (Dropping the pool also closes it; this just makes it explicit.)
    pub async fn close(self) {
        match self.pool {
            DbPool::Postgres(p) => p.close().await,
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get the SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    // Only try to create directories for plain file paths; ignore :memory: cases.
    if !create_dirs || is_sqlite_memory(dsn) {
        return Ok(dsn.to_string());
    }

    // Pragmatic parser: handles "sqlite:/path" and "sqlite://path". URI forms
    // like "sqlite:file:memdb?..." have no filesystem dir to create.
    let raw = if let Some(rest) = dsn.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = dsn.strip_prefix("sqlite:") {
        rest
    } else {
        dsn
    };
    if raw.starts_with("file:") {
        return Ok(dsn.to_string());
    }

    // Query parameters (mode=rwc etc.) are not part of the filesystem path.
    let path_part = raw.split('?').next().unwrap_or(raw);
    if let Some(parent) = std::path::Path::new(path_part).parent() {
        if !parent.as_os_str().is_empty() {
            // One-time blocking call during startup; acceptable for setup paths.
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(dsn.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_detection() {
        assert_eq!(
            DbHandle::detect("sqlite://shop.db").unwrap(),
            DbEngine::Sqlite
        );
        assert_eq!(
            DbHandle::detect("sqlite::memory:").unwrap(),
            DbEngine::Sqlite
        );
        assert_eq!(
            DbHandle::detect("postgres://localhost/shop").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("postgresql://localhost/shop").unwrap(),
            DbEngine::Postgres
        );
        assert!(DbHandle::detect("mysql://localhost/shop").is_err());
        assert!(DbHandle::detect("unknown://x").is_err());
    }

    #[tokio::test]
    async fn test_sqlite_memory_connection() -> Result<()> {
        let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
        assert_eq!(db.engine(), DbEngine::Sqlite);

        use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
        db.sea()
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                "CREATE TABLE t (id INTEGER PRIMARY KEY)",
            ))
            .await?;
        db.sea()
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                "INSERT INTO t (id) VALUES (1)",
            ))
            .await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_sqlite_file_creates_parent_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/data/shop.db");
        let dsn = format!("sqlite://{}?mode=rwc", path.display());

        let db = DbHandle::connect(&dsn, ConnectOpts::default()).await?;
        assert_eq!(db.engine(), DbEngine::Sqlite);
        assert!(path.parent().unwrap().is_dir());
        db.close().await;
        Ok(())
    }

    #[test]
    fn test_memory_dsn_detection() {
        assert!(is_sqlite_memory("sqlite::memory:"));
        assert!(is_sqlite_memory("sqlite:file:memdb1?mode=memory&cache=shared"));
        assert!(!is_sqlite_memory("sqlite:///var/lib/shop.db"));
    }
}
