//! Database layer for quire.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization
//! and the embedded SQL migrations that create the `article`, `tag` and
//! `article_tag` tables.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process is required.
//!   WAL mode allows concurrent readers alongside a single writer.
//! - **Foreign keys on every connection**: `article_tag` rows are removed by
//!   `ON DELETE CASCADE`, which SQLite only honours with `foreign_keys = ON`.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the code that queries it.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, IN_MEMORY};
