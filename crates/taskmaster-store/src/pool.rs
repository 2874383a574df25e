//! `SQLite` connection pool with WAL mode enabled.
//!
//! Uses `r2d2` pooling with the `r2d2_sqlite` backend. The
//! [`PragmaCustomizer`] runs on each new connection so WAL mode, the busy
//! timeout, and the performance pragmas are always set.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::StoreError;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 16).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// Cache size in KiB (default: 8192 = 8 MB).
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA cache_size = -{};\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms, self.cache_size_kib
        ))?;
        Ok(())
    }
}

fn builder(config: &ConnectionConfig) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
}

/// Create a file-backed connection pool.
///
/// The pool is built without opening any connection, so this never fails:
/// the process can start while the database file is unreachable, and every
/// error surfaces later from `get()` on a per-request basis.
pub fn new_file(path: &str, config: &ConnectionConfig) -> ConnectionPool {
    let manager = SqliteConnectionManager::file(path);
    builder(config).build_unchecked(manager)
}

/// Create an in-memory connection pool (for testing).
///
/// Pinned to a single connection: each `:memory:` connection is its own
/// database, so a larger pool would hand out checkouts that cannot see
/// the schema.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool, StoreError> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
        .build(manager)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal_mode(conn: &Connection) -> String {
        conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_pool_creates_successfully() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let mode = journal_mode(&conn);
        assert!(
            mode == "wal" || mode == "memory",
            "journal_mode should be wal or memory, got: {mode}"
        );
    }

    #[test]
    fn file_pool_creates_successfully() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default());
        let conn = pool.get().unwrap();
        assert_eq!(journal_mode(&conn), "wal");
    }

    #[test]
    fn file_pool_with_unreachable_path_builds_but_fails_on_get() {
        let pool = new_file(
            "/nonexistent-dir/definitely/missing.db",
            &ConnectionConfig::default(),
        );
        assert!(pool.get().is_err());
    }

    #[test]
    fn busy_timeout_applied() {
        let pool = new_in_memory(&ConnectionConfig {
            busy_timeout_ms: 12_000,
            ..ConnectionConfig::default()
        })
        .unwrap();
        let conn = pool.get().unwrap();
        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 12_000);
    }

    #[test]
    fn default_config_values() {
        let config = ConnectionConfig::default();
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.busy_timeout_ms, 30_000);
        assert_eq!(config.cache_size_kib, 8192);
    }

    #[test]
    fn file_pool_respects_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sized.db");
        let pool = new_file(
            path.to_str().unwrap(),
            &ConnectionConfig {
                pool_size: 2,
                ..ConnectionConfig::default()
            },
        );
        assert_eq!(pool.max_size(), 2);
    }
}
