//! Query modules grouped by concern. All functions are free functions over a
//! borrowed connection so they compose inside one transaction.

pub mod aggregation;
pub mod embedding_ops;
pub mod lifecycle;
pub mod link_ops;
pub mod maintenance;
pub mod memory_crud;
pub mod memory_query;
pub mod vector_search;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use engram_core::memory::{DecayRate, Memory, Salience, Sector, Strength};

/// Column list shared by every memory SELECT, in row-mapper order.
pub(crate) const MEMORY_COLUMNS: &str = "id, user_id, session_id, content, primary_sector, \
     created_at, last_accessed, access_count, strength, salience, decay_rate, \
     is_atomic, parent_id, consolidated_into, content_hash";

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map one row (selected via [`MEMORY_COLUMNS`]) into a [`Memory`].
pub(crate) fn read_memory(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let sector_name: String = row.get(4)?;
    let sector = Sector::parse_name(&sector_name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown sector {sector_name}").into(),
        )
    })?;
    let created_at: String = row.get(5)?;
    let last_accessed: String = row.get(6)?;

    Ok(Memory {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        content: row.get(3)?,
        primary_sector: sector,
        created_at: parse_ts(5, &created_at)?,
        last_accessed: parse_ts(6, &last_accessed)?,
        access_count: row.get::<_, i64>(7)?.max(0) as u64,
        strength: Strength::new(row.get(8)?),
        salience: Salience::new(row.get(9)?),
        decay_rate: DecayRate::new(row.get(10)?),
        is_atomic: row.get::<_, i64>(11)? != 0,
        parent_id: row.get(12)?,
        consolidated_into: row.get(13)?,
        content_hash: row.get(14)?,
    })
}

/// Serialize a string set into its canonical JSON array form.
pub(crate) fn set_to_json(set: &std::collections::BTreeSet<String>) -> String {
    serde_json::to_string(set).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a JSON array column back into a sorted string set.
pub(crate) fn json_to_set(s: &str) -> std::collections::BTreeSet<String> {
    serde_json::from_str(s).unwrap_or_default()
}
