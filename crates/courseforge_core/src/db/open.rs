//! Opening the project database.
//!
//! # Responsibility
//! - Hand out SQLite connections, file-backed or in-memory, that are ready
//!   for the project store.
//!
//! # Invariants
//! - A returned connection has `foreign_keys=ON`, a 5 s busy timeout and the
//!   latest schema.
//! - Every open attempt logs one `db_open` start line and one outcome line.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database file at `path`, creating missing parent
/// directories first.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", || {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| ("db_dir_failed", DbError::Io(err)))?;
        }
        Connection::open(path).map_err(|err| ("db_open_failed", err.into()))
    })
}

/// Opens a private in-memory database. Used by tests and dry runs.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", || {
        Connection::open_in_memory().map_err(|err| ("db_open_failed", err.into()))
    })
}

type Staged<T> = Result<T, (&'static str, DbError)>;

fn open_logged(mode: &str, connect: impl FnOnce() -> Staged<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let outcome = connect().and_then(|mut conn| {
        prepare(&mut conn).map_err(|err| ("db_bootstrap_failed", err))?;
        Ok(conn)
    });
    let duration_ms = started_at.elapsed().as_millis();

    match outcome {
        Ok(conn) => {
            info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}");
            Ok(conn)
        }
        Err((error_code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error_code={error_code} error={err}"
            );
            Err(err)
        }
    }
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
