//! Schema migrations compiled into the binary.
//!
//! Applied names are recorded in `_quire_migrations`; each pending step runs
//! in its own transaction together with its bookkeeping row.

use rusqlite::Connection;
use std::collections::HashSet;
use thiserror::Error;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

macro_rules! migration {
    ($name:literal) => {
        Migration {
            name: $name,
            sql: include_str!(concat!("migrations/", $name, ".sql")),
        }
    };
}

/// Ordered schema history. Append only.
const MIGRATIONS: &[Migration] = &[
    migration!("001_article"),
    migration!("002_tag"),
    migration!("003_article_tag"),
    migration!("004_tag_name_unique"),
];

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS _quire_migrations (
    name TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration, or the ledger bootstrap, could not be applied.
    #[error("migration `{name}` failed: {source}")]
    ExecutionFailed {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read applied migrations: {0}")]
    StateQuery(#[source] rusqlite::Error),
}

/// Brings the schema up to date, returning how many migrations ran.
///
/// # Errors
///
/// Fails on the first migration that does not apply; earlier ones stay
/// committed.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    apply_pending(conn, MIGRATIONS)
}

fn applied_names(conn: &Connection) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM _quire_migrations")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(names)
}

fn apply_pending(conn: &Connection, migrations: &[Migration]) -> Result<usize, MigrationError> {
    conn.execute_batch(LEDGER_DDL)
        .map_err(|source| MigrationError::ExecutionFailed {
            name: "_quire_migrations".to_string(),
            source,
        })?;

    let done = applied_names(conn).map_err(MigrationError::StateQuery)?;
    let pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !done.contains(m.name))
        .collect();

    if pending.is_empty() {
        tracing::debug!("schema is up to date");
        return Ok(0);
    }

    for migration in &pending {
        let failed = |source| MigrationError::ExecutionFailed {
            name: migration.name.to_string(),
            source,
        };

        tracing::info!(migration = migration.name, "applying migration");
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO _quire_migrations (name) VALUES (?1)",
            [migration.name],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;
    }

    Ok(pending.len())
}
