//! Versioned schema migrations, tracked through `PRAGMA user_version`.

mod v001_memory_tables;

use rusqlite::Connection;

use engram_core::errors::{EngramError, EngramResult, StorageError};

use crate::to_storage_err;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Run all pending migrations in order.
pub fn run_migrations(conn: &Connection) -> EngramResult<()> {
    let current = schema_version(conn)?;

    if current < 1 {
        v001_memory_tables::migrate(conn).map_err(|e| {
            EngramError::Storage(StorageError::MigrationFailed {
                version: 1,
                reason: e.to_string(),
            })
        })?;
        set_schema_version(conn, 1)?;
        tracing::info!(version = 1, "applied migration");
    }

    Ok(())
}

/// Read the schema version pragma.
pub fn schema_version(conn: &Connection) -> EngramResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))
        .map_err(|e| to_storage_err("schema_version", e))
}

fn set_schema_version(conn: &Connection, version: u32) -> EngramResult<()> {
    conn.pragma_update(None, "user_version", version)
        .map_err(|e| to_storage_err("set_schema_version", e))
}
