//! Insert, get, update, touch, delete for memories and their metadata.
//!
//! A full record insert writes the memory row, metadata row, five embedding
//! rows, and any links in one transaction — all-or-nothing.

use rusqlite::{params, Connection, OptionalExtension};

use engram_core::errors::EngramResult;
use engram_core::memory::{Memory, MemoryMetadata, MemoryRecord, Salience};

use super::{embedding_ops, link_ops, json_to_set, read_memory, set_to_json, MEMORY_COLUMNS};
use crate::to_storage_err;

/// Insert a full record: memory + metadata + embeddings + links, atomically.
pub fn insert_record(conn: &Connection, record: &MemoryRecord) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("insert_record begin", e))?;

    match insert_record_inner(&tx, record) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err("insert_record commit", e))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn insert_record_inner(conn: &Connection, record: &MemoryRecord) -> EngramResult<()> {
    insert_memory_row(conn, &record.memory)?;
    insert_metadata_row(conn, &record.memory.id, &record.metadata)?;
    embedding_ops::upsert_embeddings(conn, &record.embeddings)?;
    for link in &record.links {
        link_ops::upsert_link(conn, link)?;
    }
    Ok(())
}

/// Insert just the memory row.
pub fn insert_memory_row(conn: &Connection, memory: &Memory) -> EngramResult<()> {
    conn.execute(
        "INSERT INTO memories (
            id, user_id, session_id, content, primary_sector, created_at,
            last_accessed, access_count, strength, salience, decay_rate,
            is_atomic, parent_id, consolidated_into, content_hash
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            memory.id,
            memory.user_id,
            memory.session_id,
            memory.content,
            memory.primary_sector.as_str(),
            memory.created_at.to_rfc3339(),
            memory.last_accessed.to_rfc3339(),
            memory.access_count as i64,
            memory.strength.value(),
            memory.salience.value(),
            memory.decay_rate.value(),
            memory.is_atomic as i32,
            memory.parent_id,
            memory.consolidated_into,
            memory.content_hash,
        ],
    )
    .map_err(|e| to_storage_err("insert_memory_row", e))?;
    Ok(())
}

/// Insert the metadata companion row.
pub fn insert_metadata_row(
    conn: &Connection,
    memory_id: &str,
    metadata: &MemoryMetadata,
) -> EngramResult<()> {
    conn.execute(
        "INSERT INTO memory_metadata (
            memory_id, keywords, tags, category, context, importance, emotional_tags
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            memory_id,
            set_to_json(&metadata.keywords),
            set_to_json(&metadata.tags),
            metadata.category,
            metadata.context,
            metadata.importance.value(),
            set_to_json(&metadata.emotional_tags),
        ],
    )
    .map_err(|e| to_storage_err("insert_metadata_row", e))?;
    Ok(())
}

/// Fetch one memory row scoped to its user.
pub fn get_memory(conn: &Connection, user_id: &str, id: &str) -> EngramResult<Option<Memory>> {
    conn.query_row(
        &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        read_memory,
    )
    .optional()
    .map_err(|e| to_storage_err("get_memory", e))
}

/// Fetch the metadata row for a memory. Missing rows come back as defaults
/// so callers never observe a half-present record.
pub fn get_metadata(conn: &Connection, memory_id: &str) -> EngramResult<MemoryMetadata> {
    let row = conn
        .query_row(
            "SELECT keywords, tags, category, context, importance, emotional_tags
             FROM memory_metadata WHERE memory_id = ?1",
            params![memory_id],
            |row| {
                let keywords: String = row.get(0)?;
                let tags: String = row.get(1)?;
                let emotional: String = row.get(5)?;
                Ok(MemoryMetadata {
                    keywords: json_to_set(&keywords),
                    tags: json_to_set(&tags),
                    category: row.get(2)?,
                    context: row.get(3)?,
                    importance: Salience::new(row.get(4)?),
                    emotional_tags: json_to_set(&emotional),
                })
            },
        )
        .optional()
        .map_err(|e| to_storage_err("get_metadata", e))?;
    Ok(row.unwrap_or_default())
}

/// Fetch the full record: memory + metadata + links + embeddings.
pub fn get_record(
    conn: &Connection,
    user_id: &str,
    id: &str,
) -> EngramResult<Option<MemoryRecord>> {
    let Some(memory) = get_memory(conn, user_id, id)? else {
        return Ok(None);
    };
    let metadata = get_metadata(conn, id)?;
    let links = link_ops::links_from(conn, id)?;
    let embeddings = embedding_ops::embeddings_for(conn, id)?;
    Ok(Some(MemoryRecord {
        memory,
        metadata,
        links,
        embeddings,
    }))
}

/// Fetch several memories by id, preserving only rows that exist.
pub fn get_bulk(conn: &Connection, user_id: &str, ids: &[String]) -> EngramResult<Vec<Memory>> {
    let mut out = Vec::with_capacity(ids.len());
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1 AND user_id = ?2"
        ))
        .map_err(|e| to_storage_err("get_bulk prepare", e))?;
    for id in ids {
        let row = stmt
            .query_row(params![id, user_id], read_memory)
            .optional()
            .map_err(|e| to_storage_err("get_bulk", e))?;
        if let Some(m) = row {
            out.push(m);
        }
    }
    Ok(out)
}

/// Overwrite the mutable columns of a memory row.
pub fn update_memory(conn: &Connection, memory: &Memory) -> EngramResult<()> {
    let affected = conn
        .execute(
            "UPDATE memories SET
                session_id = ?3, content = ?4, primary_sector = ?5,
                last_accessed = ?6, access_count = ?7, strength = ?8,
                salience = ?9, decay_rate = ?10, is_atomic = ?11,
                parent_id = ?12, consolidated_into = ?13, content_hash = ?14
             WHERE id = ?1 AND user_id = ?2",
            params![
                memory.id,
                memory.user_id,
                memory.session_id,
                memory.content,
                memory.primary_sector.as_str(),
                memory.last_accessed.to_rfc3339(),
                memory.access_count as i64,
                memory.strength.value(),
                memory.salience.value(),
                memory.decay_rate.value(),
                memory.is_atomic as i32,
                memory.parent_id,
                memory.consolidated_into,
                memory.content_hash,
            ],
        )
        .map_err(|e| to_storage_err("update_memory", e))?;
    if affected == 0 {
        return Err(engram_core::EngramError::not_found("memory", &memory.id));
    }
    Ok(())
}

/// Upsert the metadata row.
pub fn update_metadata(
    conn: &Connection,
    memory_id: &str,
    metadata: &MemoryMetadata,
) -> EngramResult<()> {
    conn.execute(
        "INSERT INTO memory_metadata (
            memory_id, keywords, tags, category, context, importance, emotional_tags
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(memory_id) DO UPDATE SET
            keywords = excluded.keywords,
            tags = excluded.tags,
            category = excluded.category,
            context = excluded.context,
            importance = excluded.importance,
            emotional_tags = excluded.emotional_tags",
        params![
            memory_id,
            set_to_json(&metadata.keywords),
            set_to_json(&metadata.tags),
            metadata.category,
            metadata.context,
            metadata.importance.value(),
            set_to_json(&metadata.emotional_tags),
        ],
    )
    .map_err(|e| to_storage_err("update_metadata", e))?;
    Ok(())
}

/// Record an access in its own transaction.
pub fn touch_memory(
    conn: &Connection,
    user_id: &str,
    id: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> EngramResult<()> {
    conn.execute(
        "UPDATE memories SET last_accessed = ?3, access_count = access_count + 1
         WHERE id = ?1 AND user_id = ?2",
        params![id, user_id, now.to_rfc3339()],
    )
    .map_err(|e| to_storage_err("touch_memory", e))?;
    Ok(())
}

/// Apply a strength reward, capped at 1.0.
pub fn reinforce_memory(
    conn: &Connection,
    user_id: &str,
    id: &str,
    reward: f64,
) -> EngramResult<()> {
    conn.execute(
        "UPDATE memories SET strength = MIN(1.0, strength + ?3)
         WHERE id = ?1 AND user_id = ?2",
        params![id, user_id, reward],
    )
    .map_err(|e| to_storage_err("reinforce_memory", e))?;
    Ok(())
}

/// Delete a memory; metadata, embeddings, and links cascade.
pub fn delete_memory(conn: &Connection, user_id: &str, id: &str) -> EngramResult<bool> {
    let affected = conn
        .execute(
            "DELETE FROM memories WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .map_err(|e| to_storage_err("delete_memory", e))?;
    Ok(affected > 0)
}
