//! Aggregate metrics feeding the health monitor.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use engram_core::errors::EngramResult;
use engram_core::memory::{Sector, Strength};
use engram_core::models::{AgeBuckets, ForgettingCandidateCounts};

use crate::to_storage_err;

/// Access count at or below which a memory counts as low-access.
const LOW_ACCESS_THRESHOLD: i64 = 1;

/// Age in days past which a memory counts as old for candidate purposes.
const OLD_AGE_DAYS: i64 = 90;

/// Visible memory counts per sector, zero-filled for all five.
pub fn count_by_sector(conn: &Connection, user_id: &str) -> EngramResult<BTreeMap<Sector, u64>> {
    let mut out: BTreeMap<Sector, u64> = Sector::ALL.iter().map(|&s| (s, 0)).collect();
    let mut stmt = conn
        .prepare(
            "SELECT primary_sector, COUNT(*) FROM memories
             WHERE user_id = ?1 AND consolidated_into IS NULL
             GROUP BY primary_sector",
        )
        .map_err(|e| to_storage_err("count_by_sector prepare", e))?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| to_storage_err("count_by_sector", e))?;
    for row in rows {
        let (name, count) = row.map_err(|e| to_storage_err("count_by_sector", e))?;
        if let Some(sector) = Sector::parse_name(&name) {
            out.insert(sector, count.max(0) as u64);
        }
    }
    Ok(out)
}

/// Visible memory counts bucketed by age since creation.
pub fn count_by_age(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> EngramResult<AgeBuckets> {
    let day = (now - Duration::days(1)).to_rfc3339();
    let week = (now - Duration::weeks(1)).to_rfc3339();
    let month = (now - Duration::days(30)).to_rfc3339();

    let (last_day, last_week, last_month, older) = conn
        .query_row(
            "SELECT
                SUM(created_at >= ?2),
                SUM(created_at < ?2 AND created_at >= ?3),
                SUM(created_at < ?3 AND created_at >= ?4),
                SUM(created_at < ?4)
             FROM memories WHERE user_id = ?1 AND consolidated_into IS NULL",
            params![user_id, day, week, month],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                ))
            },
        )
        .map_err(|e| to_storage_err("count_by_age", e))?;

    Ok(AgeBuckets {
        last_day: last_day.max(0) as u64,
        last_week: last_week.max(0) as u64,
        last_month: last_month.max(0) as u64,
        older: older.max(0) as u64,
    })
}

/// content bytes + embedding bytes for one user.
pub fn bytes_used(conn: &Connection, user_id: &str) -> EngramResult<u64> {
    let content: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(content AS BLOB))), 0)
             FROM memories WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err("bytes_used content", e))?;
    let embeddings: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(LENGTH(me.vector)), 0)
             FROM memory_embeddings me
             JOIN memories m ON m.id = me.memory_id
             WHERE m.user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err("bytes_used embeddings", e))?;
    Ok((content.max(0) + embeddings.max(0)) as u64)
}

/// Forgetting candidate counts by criterion plus the deduplicated total.
pub fn forgetting_candidate_counts(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> EngramResult<ForgettingCandidateCounts> {
    let old_cutoff = (now - Duration::days(OLD_AGE_DAYS)).to_rfc3339();
    let floor = Strength::FORGETTING_FLOOR;

    let (low_strength, old_age, low_access, total_unique) = conn
        .query_row(
            "SELECT
                SUM(strength <= ?2),
                SUM(created_at < ?3),
                SUM(access_count <= ?4),
                SUM(strength <= ?2 OR created_at < ?3 OR access_count <= ?4)
             FROM memories WHERE user_id = ?1 AND consolidated_into IS NULL",
            params![user_id, floor, old_cutoff, LOW_ACCESS_THRESHOLD],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                ))
            },
        )
        .map_err(|e| to_storage_err("forgetting_candidate_counts", e))?;

    Ok(ForgettingCandidateCounts {
        low_strength: low_strength.max(0) as u64,
        old_age: old_age.max(0) as u64,
        low_access: low_access.max(0) as u64,
        total_unique: total_unique.max(0) as u64,
    })
}

/// Visible memories not accessed since the cutoff.
pub fn stale_count(
    conn: &Connection,
    user_id: &str,
    accessed_before: DateTime<Utc>,
) -> EngramResult<u64> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM memories
             WHERE user_id = ?1 AND last_accessed < ?2 AND consolidated_into IS NULL",
            params![user_id, accessed_before.to_rfc3339()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err("stale_count", e))?;
    Ok(n.max(0) as u64)
}

/// Atomic episodic memories not yet consolidated. When the
/// `consolidated_into` column is absent (legacy imports), falls back to the
/// plain sector count.
pub fn consolidation_queue_depth(conn: &Connection, user_id: &str) -> EngramResult<u64> {
    let result: Result<i64, rusqlite::Error> = conn.query_row(
        "SELECT COUNT(*) FROM memories
         WHERE user_id = ?1 AND primary_sector = 'episodic'
           AND is_atomic = 1 AND consolidated_into IS NULL",
        params![user_id],
        |row| row.get(0),
    );
    match result {
        Ok(n) => Ok(n.max(0) as u64),
        Err(e) if e.to_string().contains("no such column") => {
            let n: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM memories
                     WHERE user_id = ?1 AND primary_sector = 'episodic'",
                    params![user_id],
                    |row| row.get(0),
                )
                .map_err(|e| to_storage_err("consolidation_queue_depth fallback", e))?;
            Ok(n.max(0) as u64)
        }
        Err(e) => Err(to_storage_err("consolidation_queue_depth", e)),
    }
}
