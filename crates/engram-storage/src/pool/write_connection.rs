//! The single write connection. All mutations funnel through here so SQLite
//! never sees two concurrent writers.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use engram_core::errors::EngramResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Owns the one connection allowed to write.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open the write connection for the given database file.
    pub fn open(path: &Path) -> EngramResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err("open_writer", e))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory write connection (for testing).
    pub fn open_in_memory() -> EngramResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err("open_writer", e))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure while holding the writer.
    pub fn with_conn_sync<F, T>(&self, f: F) -> EngramResult<T>
    where
        F: FnOnce(&Connection) -> EngramResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err("writer_lock", format!("lock poisoned: {e}")))?;
        f(&guard)
    }
}
