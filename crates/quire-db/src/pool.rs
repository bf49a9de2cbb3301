//! Pooled SQLite connections for the catalog.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use thiserror::Error;

/// Path that opens a private in-memory database per connection.
pub const IN_MEMORY: &str = ":memory:";

/// Connection tunables read from the `[database]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on open connections. Ignored for [`IN_MEMORY`].
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to open database pool at `{path}`: {source}")]
    PoolInit {
        path: String,
        #[source]
        source: r2d2::Error,
    },
}

/// Opens a pool over `db_path`.
///
/// Each checkout runs with foreign keys enforced and the configured busy
/// timeout. File databases are switched to WAL. An in-memory path gets a
/// single connection, since every SQLite connection to `:memory:` sees its
/// own empty database. That connection is never reaped for idleness or
/// age, so the data lives as long as the pool.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the first connection cannot be opened
/// or initialized.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let in_memory = db_path == IN_MEMORY;
    let max_size = if in_memory {
        1
    } else {
        settings.pool_max_size.max(1)
    };
    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| prepare_connection(conn, busy_timeout, in_memory));

    let mut builder = Pool::builder().max_size(max_size);
    if in_memory {
        // the database lives only as long as its single connection
        builder = builder
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = builder
        .build(manager)
        .map_err(|source| PoolError::PoolInit {
            path: db_path.to_string(),
            source,
        })?;

    tracing::debug!(path = db_path, max_size, "database pool ready");
    Ok(pool)
}

fn prepare_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    in_memory: bool,
) -> rusqlite::Result<()> {
    if !in_memory {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("journal_mode stayed `{mode}` after requesting WAL")),
            ));
        }
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(busy_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma_i64(conn: &Connection, name: &str) -> i64 {
        conn.pragma_query_value(None, name, |row| row.get(0))
            .expect("pragma should be readable")
    }

    #[test]
    fn memory_pool_is_single_connection_with_pragmas() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 3,
        };
        let pool = create_pool(IN_MEMORY, settings).expect("pool should open");
        assert_eq!(pool.max_size(), 1);

        let conn = pool.get().expect("checkout should succeed");
        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
        assert_eq!(pragma_i64(&conn, "busy_timeout"), 2_500);
    }

    #[test]
    fn memory_pool_connection_is_never_reaped() {
        let pool = create_pool(IN_MEMORY, DbRuntimeSettings::default()).expect("pool should open");
        assert_eq!(pool.idle_timeout(), None);
        assert_eq!(pool.max_lifetime(), None);
        assert_eq!(pool.min_idle(), Some(1));

        pool.get()
            .expect("checkout should succeed")
            .execute_batch("CREATE TABLE marker (id INTEGER PRIMARY KEY);")
            .expect("marker table should be created");

        let state = pool.state();
        assert_eq!(state.connections, 1);
        assert_eq!(state.idle_connections, 1);
    }

    #[test]
    fn file_pool_keeps_default_reaping() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("catalog.db");
        let pool = create_pool(
            path.to_str().expect("utf-8 temp path"),
            DbRuntimeSettings::default(),
        )
        .expect("pool should open");
        assert!(pool.idle_timeout().is_some());
        assert!(pool.max_lifetime().is_some());
    }

    #[test]
    fn memory_pool_checkouts_see_the_same_schema() {
        let pool = create_pool(IN_MEMORY, DbRuntimeSettings::default()).expect("pool should open");
        pool.get()
            .expect("checkout should succeed")
            .execute_batch("CREATE TABLE marker (id INTEGER PRIMARY KEY);")
            .expect("marker table should be created");

        let conn = pool.get().expect("checkout should succeed");
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'marker'",
                [],
                |row| row.get(0),
            )
            .expect("sqlite_master should be readable");
        assert_eq!(found, 1);
    }

    #[test]
    fn file_pool_switches_to_wal() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("catalog.db");
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 4,
        };
        let pool = create_pool(path.to_str().expect("utf-8 temp path"), settings)
            .expect("pool should open");
        assert_eq!(pool.max_size(), 4);

        let conn = pool.get().expect("checkout should succeed");
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("journal_mode should be readable");
        assert_eq!(mode, "wal");
    }

    #[test]
    fn zero_pool_size_is_raised_to_one() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("catalog.db");
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 0,
        };
        let pool = create_pool(path.to_str().expect("utf-8 temp path"), settings)
            .expect("pool should open");
        assert_eq!(pool.max_size(), 1);
    }
}
