//! Service layer: repository orchestration, transaction boundaries and
//! translation of absence into [`CatalogError`](crate::CatalogError).

pub mod articles;
pub mod tags;

use crate::error::CatalogError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Opens a write transaction that takes the database write lock up front, so
/// a read-check-write sequence cannot interleave with another writer.
fn write_transaction(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

/// Runs `read` inside a deferred transaction so all of its queries see one
/// snapshot. A connection already inside a transaction is used as is.
pub(crate) fn read_snapshot<T>(
    conn: &Connection,
    read: impl FnOnce(&Connection) -> Result<T, CatalogError>,
) -> Result<T, CatalogError> {
    if !conn.is_autocommit() {
        return read(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = read(&*tx)?;
    tx.commit()?;
    Ok(value)
}
