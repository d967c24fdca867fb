//! Filtered memory queries: the SQL-layer filter pass of search, plus the
//! batch feeds for the maintenance engines.

use rusqlite::{Connection, ToSql};

use engram_core::errors::EngramResult;
use engram_core::models::SearchFilters;
use engram_core::memory::Memory;

use super::{read_memory, MEMORY_COLUMNS};
use crate::to_storage_err;

/// Dynamically built WHERE fragment plus its bound parameters.
pub(crate) struct FilterSql {
    pub clauses: Vec<String>,
    pub params: Vec<Box<dyn ToSql>>,
}

/// Translate [`SearchFilters`] into SQL conditions over `m` (memories) and
/// `md` (memory_metadata).
pub(crate) fn filter_sql(
    user_id: &str,
    filters: &SearchFilters,
    include_consolidated: bool,
) -> FilterSql {
    let mut clauses: Vec<String> = vec!["m.user_id = ?".to_string()];
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];

    if !include_consolidated {
        clauses.push("m.consolidated_into IS NULL".to_string());
    }

    if let Some(sectors) = &filters.sectors {
        if !sectors.is_empty() {
            let marks = vec!["?"; sectors.len()].join(", ");
            clauses.push(format!("m.primary_sector IN ({marks})"));
            for s in sectors {
                params.push(Box::new(s.as_str().to_string()));
            }
        }
    }

    if let Some(tags) = &filters.tags {
        if !tags.is_empty() {
            let marks = vec!["?"; tags.len()].join(", ");
            // Tag filter is an OR: any shared tag admits the memory.
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM json_each(md.tags) je WHERE je.value IN ({marks}))"
            ));
            for t in tags {
                params.push(Box::new(t.clone()));
            }
        }
    }

    if let Some((from, to)) = &filters.date_range {
        clauses.push("m.created_at >= ? AND m.created_at <= ?".to_string());
        params.push(Box::new(from.to_rfc3339()));
        params.push(Box::new(to.to_rfc3339()));
    }

    if let Some(min_salience) = filters.min_salience {
        clauses.push("m.salience >= ?".to_string());
        params.push(Box::new(min_salience));
    }

    if let Some(min_strength) = filters.min_strength {
        clauses.push("m.strength >= ?".to_string());
        params.push(Box::new(min_strength));
    }

    FilterSql { clauses, params }
}

/// All memories matching the filters, creation-date descending.
pub fn query_filtered(
    conn: &Connection,
    user_id: &str,
    filters: &SearchFilters,
    include_consolidated: bool,
) -> EngramResult<Vec<Memory>> {
    let filter = filter_sql(user_id, filters, include_consolidated);
    let sql = format!(
        "SELECT {cols} FROM memories m
         LEFT JOIN memory_metadata md ON md.memory_id = m.id
         WHERE {wheres}
         ORDER BY m.created_at DESC",
        cols = MEMORY_COLUMNS
            .split(", ")
            .map(|c| format!("m.{c}"))
            .collect::<Vec<_>>()
            .join(", "),
        wheres = filter.clauses.join(" AND "),
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err("query_filtered prepare", e))?;
    let param_refs: Vec<&dyn ToSql> = filter.params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), read_memory)
        .map_err(|e| to_storage_err("query_filtered", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("query_filtered", e))
}

/// Visible memories not accessed since the cutoff, ordered by id for stable
/// batch pagination.
pub fn stale_memories(
    conn: &Connection,
    user_id: &str,
    accessed_before: chrono::DateTime<chrono::Utc>,
    limit: usize,
    offset: usize,
) -> EngramResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories
             WHERE user_id = ?1 AND last_accessed < ?2 AND consolidated_into IS NULL
             ORDER BY id LIMIT ?3 OFFSET ?4"
        ))
        .map_err(|e| to_storage_err("stale_memories prepare", e))?;
    let rows = stmt
        .query_map(
            rusqlite::params![
                user_id,
                accessed_before.to_rfc3339(),
                limit as i64,
                offset as i64
            ],
            read_memory,
        )
        .map_err(|e| to_storage_err("stale_memories", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("stale_memories", e))
}

/// Atomic episodic memories that have not been folded into a parent.
pub fn unconsolidated_episodic(conn: &Connection, user_id: &str) -> EngramResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories
             WHERE user_id = ?1 AND primary_sector = 'episodic'
               AND is_atomic = 1 AND consolidated_into IS NULL
             ORDER BY created_at"
        ))
        .map_err(|e| to_storage_err("unconsolidated_episodic prepare", e))?;
    let rows = stmt
        .query_map(rusqlite::params![user_id], read_memory)
        .map_err(|e| to_storage_err("unconsolidated_episodic", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("unconsolidated_episodic", e))
}

/// Distinct user ids present in the store.
pub fn list_user_ids(conn: &Connection) -> EngramResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT user_id FROM memories ORDER BY user_id")
        .map_err(|e| to_storage_err("list_user_ids prepare", e))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err("list_user_ids", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("list_user_ids", e))
}
