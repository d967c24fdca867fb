//! Per-sector nearest-neighbor probe over stored embeddings.
//!
//! Brute-force cosine scan over the user's filtered candidate rows. Vectors
//! are unit-normalized at write time, so cosine reduces to a dot product.

use rusqlite::{Connection, ToSql};

use engram_core::errors::EngramResult;
use engram_core::memory::Sector;
use engram_core::models::SearchFilters;

use super::memory_query::filter_sql;
use crate::{bytes_to_f32_vec, to_storage_err};

/// Probe one sector: (memory_id, cosine similarity) descending, ≤ `limit`.
pub fn sector_probe(
    conn: &Connection,
    user_id: &str,
    sector: Sector,
    query: &[f32],
    filters: &SearchFilters,
    limit: usize,
    include_consolidated: bool,
) -> EngramResult<Vec<(String, f64)>> {
    // Zero-norm queries match nothing.
    let query_norm_sq: f64 = query.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    if query_norm_sq == 0.0 || limit == 0 {
        return Ok(Vec::new());
    }

    let filter = filter_sql(user_id, filters, include_consolidated);
    let sql = format!(
        "SELECT me.memory_id, me.vector, me.dimensions
         FROM memory_embeddings me
         JOIN memories m ON m.id = me.memory_id
         LEFT JOIN memory_metadata md ON md.memory_id = m.id
         WHERE me.sector = ? AND {wheres}",
        wheres = filter.clauses.join(" AND "),
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err("sector_probe prepare", e))?;

    let sector_name = sector.as_str().to_string();
    let mut param_refs: Vec<&dyn ToSql> = vec![&sector_name];
    for p in &filter.params {
        param_refs.push(p.as_ref());
    }

    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            let memory_id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let dims: i64 = row.get(2)?;
            Ok((memory_id, blob, dims as usize))
        })
        .map_err(|e| to_storage_err("sector_probe", e))?;

    let mut scored: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let (memory_id, blob, dims) = row.map_err(|e| to_storage_err("sector_probe", e))?;
        // Dimension mismatches are skipped, not errors: they can only appear
        // transiently around a provider migration.
        if dims != query.len() {
            continue;
        }
        let stored = bytes_to_f32_vec(&blob, dims);
        let sim = dot(query, &stored);
        if sim > 0.0 {
            scored.push((memory_id, sim));
        }
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);
    Ok(scored)
}

/// Dot product in f64 accumulation.
fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}
