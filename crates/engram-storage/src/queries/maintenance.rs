//! Database maintenance.

use rusqlite::Connection;

use engram_core::errors::EngramResult;

use crate::to_storage_err;

/// Reclaim free pages.
pub fn full_vacuum(conn: &Connection) -> EngramResult<()> {
    conn.execute_batch("VACUUM")
        .map_err(|e| to_storage_err("vacuum", e))?;
    Ok(())
}
