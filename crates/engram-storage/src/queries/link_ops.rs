//! Link edge storage. Uniqueness on (source, target, type); self-loops and
//! cross-user endpoints are rejected before the row is written.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};

use engram_core::errors::{EngramError, EngramResult, StorageError};
use engram_core::memory::{LinkType, LinkWeight, MemoryLink};

use crate::to_storage_err;

/// Insert or update a link on its (source, target, type) key.
/// The caller is responsible for endpoint validation when composing inside a
/// larger transaction; [`upsert_link_checked`] does it here.
pub fn upsert_link(conn: &Connection, link: &MemoryLink) -> EngramResult<()> {
    if link.is_self_loop() {
        return Err(EngramError::Storage(StorageError::ConstraintViolation {
            step: "upsert_link".to_string(),
            message: format!("self-loop on {}", link.source_id),
        }));
    }
    conn.execute(
        "INSERT INTO memory_links (source_id, target_id, link_type, weight)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(source_id, target_id, link_type) DO UPDATE SET
            weight = excluded.weight",
        params![
            link.source_id,
            link.target_id,
            link.link_type.as_str(),
            link.weight.value(),
        ],
    )
    .map_err(|e| to_storage_err("upsert_link", e))?;
    Ok(())
}

/// Upsert after verifying both endpoints exist and belong to `user_id`.
pub fn upsert_link_checked(
    conn: &Connection,
    user_id: &str,
    link: &MemoryLink,
) -> EngramResult<()> {
    for endpoint in [&link.source_id, &link.target_id] {
        let owner: Option<String> = conn
            .query_row(
                "SELECT user_id FROM memories WHERE id = ?1",
                params![endpoint],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| to_storage_err("upsert_link_checked", e))?;
        match owner {
            None => return Err(EngramError::not_found("memory", endpoint.clone())),
            Some(owner) if owner != user_id => {
                return Err(EngramError::Storage(StorageError::ConstraintViolation {
                    step: "upsert_link_checked".to_string(),
                    message: format!("link endpoint {endpoint} belongs to another user"),
                }))
            }
            Some(_) => {}
        }
    }
    upsert_link(conn, link)
}

fn read_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryLink> {
    let link_type: String = row.get(2)?;
    Ok(MemoryLink {
        source_id: row.get(0)?,
        target_id: row.get(1)?,
        link_type: LinkType::parse_name(&link_type),
        weight: LinkWeight::new(row.get(3)?),
    })
}

/// All outgoing links of a memory, in canonical (target, type) order.
pub fn links_from(conn: &Connection, memory_id: &str) -> EngramResult<Vec<MemoryLink>> {
    let mut stmt = conn
        .prepare(
            "SELECT source_id, target_id, link_type, weight FROM memory_links
             WHERE source_id = ?1 ORDER BY target_id, link_type",
        )
        .map_err(|e| to_storage_err("links_from prepare", e))?;
    let rows = stmt
        .query_map(params![memory_id], read_link)
        .map_err(|e| to_storage_err("links_from", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("links_from", e))
}

/// All links whose source AND target both fall inside `ids`.
pub fn links_among(
    conn: &Connection,
    user_id: &str,
    ids: &[String],
) -> EngramResult<Vec<MemoryLink>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT l.source_id, l.target_id, l.link_type, l.weight
         FROM memory_links l
         JOIN memories s ON s.id = l.source_id
         WHERE s.user_id = ?{user_param}
           AND l.source_id IN ({placeholders})
           AND l.target_id IN ({placeholders})",
        user_param = ids.len() + 1,
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err("links_among prepare", e))?;

    let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(ids.len() + 1);
    for id in ids {
        params_vec.push(id);
    }
    let user = user_id.to_string();
    params_vec.push(&user);

    let rows = stmt
        .query_map(params_vec.as_slice(), read_link)
        .map_err(|e| to_storage_err("links_among", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err("links_among", e))
}

/// Number of incoming links per memory, for link-density risk factors.
pub fn incoming_link_counts(
    conn: &Connection,
    user_id: &str,
    ids: &[String],
) -> EngramResult<BTreeMap<String, usize>> {
    let mut out = BTreeMap::new();
    let mut stmt = conn
        .prepare(
            "SELECT COUNT(*) FROM memory_links l
             JOIN memories s ON s.id = l.source_id
             WHERE l.target_id = ?1 AND s.user_id = ?2",
        )
        .map_err(|e| to_storage_err("incoming_link_counts prepare", e))?;
    for id in ids {
        let count: i64 = stmt
            .query_row(params![id, user_id], |row| row.get(0))
            .map_err(|e| to_storage_err("incoming_link_counts", e))?;
        out.insert(id.clone(), count.max(0) as usize);
    }
    Ok(out)
}
