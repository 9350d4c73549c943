//! Database connection management
//!
//! Staging and warehouse live in separate SQLite files; each is migrated
//! with its own migration set on open. For a checkout the warehouse file is
//! attached to the staging connection under [`WAREHOUSE_SCHEMA`], so both
//! commit in one transaction. That needs the rollback journal: with WAL
//! SQLite only keeps each file atomic on its own.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::migrations::{apply_migrations, MigrationSet};
use hqw_core::errors::{HqError, HqErrorKind};
use rusqlite::{Connection, DatabaseName, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// How long a write waits for another process's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema name of the warehouse when attached to a staging connection
pub const WAREHOUSE_SCHEMA: &str = "warehouse";

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open a SQLite database that must already exist; a missing file is an
/// error instead of a new empty database
pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection: foreign keys on, rollback journal, busy timeout
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(from_rusqlite)?;

    // journal_mode answers with the resulting mode ("memory" for in-memory databases)
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "DELETE", |row| row.get(0))
        .map_err(from_rusqlite)?;

    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;

    Ok(())
}

/// Open, configure and migrate a staging database
pub fn open_staging<P: AsRef<Path>>(path: P) -> Result<Connection> {
    prepare(open(path)?, MigrationSet::Staging)
}

/// Open, configure and migrate a staging database that must already exist
pub fn open_existing_staging<P: AsRef<Path>>(path: P) -> Result<Connection> {
    prepare(open_existing(path)?, MigrationSet::Staging)
}

/// Attach the warehouse file at `path` to `conn` as [`WAREHOUSE_SCHEMA`].
///
/// Table names of the two databases do not overlap (apart from
/// `schema_version`), so unqualified SQL reaches either side.
pub fn attach_warehouse(conn: &Connection, path: &Path) -> Result<()> {
    let path_text = path.to_str().ok_or_else(|| {
        HqError::new(HqErrorKind::Config)
            .with_op("attach_warehouse")
            .with_message(format!("warehouse path is not valid UTF-8: {}", path.display()))
    })?;
    conn.execute(
        &format!("ATTACH DATABASE ?1 AS {}", WAREHOUSE_SCHEMA),
        [path_text],
    )
    .map_err(from_rusqlite)?;
    let _mode: String = conn
        .pragma_update_and_check(
            Some(DatabaseName::Attached(WAREHOUSE_SCHEMA)),
            "journal_mode",
            "DELETE",
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    Ok(())
}

/// Open, configure and migrate a warehouse database
pub fn open_warehouse<P: AsRef<Path>>(path: P) -> Result<Connection> {
    prepare(open(path)?, MigrationSet::Warehouse)
}

/// Configure and migrate an already open connection
pub fn prepare(mut conn: Connection, set: MigrationSet) -> Result<Connection> {
    configure(&conn)?;
    apply_migrations(&mut conn, set)?;
    Ok(conn)
}
