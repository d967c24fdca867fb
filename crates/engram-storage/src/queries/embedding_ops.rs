//! Embedding row storage: five per-sector vectors per memory, BLOB-encoded.

use rusqlite::{params, Connection};

use engram_core::errors::EngramResult;
use engram_core::memory::{Sector, SectorEmbedding};

use super::parse_ts;
use crate::{bytes_to_f32_vec, f32_vec_to_bytes, to_storage_err};

/// Insert or overwrite embedding rows on the (memory_id, sector) key.
pub fn upsert_embeddings(conn: &Connection, rows: &[SectorEmbedding]) -> EngramResult<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO memory_embeddings (memory_id, sector, vector, dimensions, model_id, captured_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(memory_id, sector) DO UPDATE SET
                vector = excluded.vector,
                dimensions = excluded.dimensions,
                model_id = excluded.model_id,
                captured_at = excluded.captured_at",
        )
        .map_err(|e| to_storage_err("upsert_embeddings prepare", e))?;

    for row in rows {
        stmt.execute(params![
            row.memory_id,
            row.sector.as_str(),
            f32_vec_to_bytes(&row.vector),
            row.vector.len() as i64,
            row.model_id,
            row.captured_at.to_rfc3339(),
        ])
        .map_err(|e| to_storage_err("upsert_embeddings", e))?;
    }
    Ok(())
}

/// All embedding rows for one memory, in canonical sector order.
pub fn embeddings_for(conn: &Connection, memory_id: &str) -> EngramResult<Vec<SectorEmbedding>> {
    let mut stmt = conn
        .prepare(
            "SELECT sector, vector, dimensions, model_id, captured_at
             FROM memory_embeddings WHERE memory_id = ?1 ORDER BY sector",
        )
        .map_err(|e| to_storage_err("embeddings_for prepare", e))?;

    let rows = stmt
        .query_map(params![memory_id], |row| {
            let sector_name: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let dims: i64 = row.get(2)?;
            let captured: String = row.get(4)?;
            let sector = Sector::parse_name(&sector_name).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unknown sector {sector_name}").into(),
                )
            })?;
            Ok(SectorEmbedding {
                memory_id: memory_id.to_string(),
                sector,
                vector: bytes_to_f32_vec(&blob, dims as usize),
                model_id: row.get(3)?,
                captured_at: parse_ts(4, &captured)?,
            })
        })
        .map_err(|e| to_storage_err("embeddings_for", e))?;

    let mut out = Vec::with_capacity(Sector::COUNT);
    for r in rows {
        out.push(r.map_err(|e| to_storage_err("embeddings_for", e))?);
    }
    // Canonical order is the enum order, not SQL's lexicographic sort.
    out.sort_by_key(|e| Sector::ALL.iter().position(|&s| s == e.sector));
    Ok(out)
}

/// One sector's vectors for a set of memories, scoped to a user.
pub fn sector_vectors(
    conn: &Connection,
    user_id: &str,
    sector: Sector,
    ids: &[String],
) -> EngramResult<Vec<(String, Vec<f32>)>> {
    let mut stmt = conn
        .prepare(
            "SELECT me.vector, me.dimensions
             FROM memory_embeddings me
             JOIN memories m ON m.id = me.memory_id
             WHERE me.memory_id = ?1 AND me.sector = ?2 AND m.user_id = ?3",
        )
        .map_err(|e| to_storage_err("sector_vectors prepare", e))?;

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let row = stmt
            .query_row(params![id, sector.as_str(), user_id], |row| {
                let blob: Vec<u8> = row.get(0)?;
                let dims: i64 = row.get(1)?;
                Ok(bytes_to_f32_vec(&blob, dims as usize))
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => e,
                other => other,
            });
        match row {
            Ok(v) => out.push((id.clone(), v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => continue,
            Err(e) => return Err(to_storage_err("sector_vectors", e)),
        }
    }
    Ok(out)
}
