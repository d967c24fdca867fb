//! Lifecycle batches: consolidation marking, archive/restore, strength and
//! salience batch updates. Each function is one transaction.

use rusqlite::{params, Connection};

use engram_core::constants::TOMBSTONE_ID;
use engram_core::errors::EngramResult;
use engram_core::memory::MemoryRecord;

use super::{embedding_ops, memory_crud};
use crate::to_storage_err;

/// Commit one consolidation cluster atomically: insert the parent record and
/// point every child's `parent_id`/`consolidated_into` at it, all in a
/// single transaction.
pub fn commit_cluster(
    conn: &Connection,
    parent: &MemoryRecord,
    child_ids: &[String],
) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("commit_cluster begin", e))?;

    let result = (|| -> EngramResult<()> {
        memory_crud::insert_memory_row(&tx, &parent.memory)?;
        memory_crud::insert_metadata_row(&tx, &parent.memory.id, &parent.metadata)?;
        embedding_ops::upsert_embeddings(&tx, &parent.embeddings)?;

        let mut stmt = tx
            .prepare(
                "UPDATE memories SET parent_id = ?3, consolidated_into = ?3
                 WHERE id = ?1 AND user_id = ?2",
            )
            .map_err(|e| to_storage_err("commit_cluster prepare", e))?;
        for child in child_ids {
            stmt.execute(params![child, parent.memory.user_id, parent.memory.id])
                .map_err(|e| to_storage_err("commit_cluster mark", e))?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err("commit_cluster commit", e))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Set every child's `parent_id` and `consolidated_into` to the parent.
pub fn mark_consolidated(
    conn: &Connection,
    user_id: &str,
    child_ids: &[String],
    parent_id: &str,
) -> EngramResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("mark_consolidated begin", e))?;

    let result = (|| -> EngramResult<()> {
        let mut stmt = tx
            .prepare(
                "UPDATE memories SET parent_id = ?3, consolidated_into = ?3
                 WHERE id = ?1 AND user_id = ?2",
            )
            .map_err(|e| to_storage_err("mark_consolidated prepare", e))?;
        for child in child_ids {
            stmt.execute(params![child, user_id, parent_id])
                .map_err(|e| to_storage_err("mark_consolidated", e))?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err("mark_consolidated commit", e))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Archive (tombstone) or restore a batch of memories. Restore only touches
/// rows currently archived — consolidation pointers are left alone.
pub fn set_archived(
    conn: &Connection,
    user_id: &str,
    ids: &[String],
    archived: bool,
) -> EngramResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("set_archived begin", e))?;

    let result = (|| -> EngramResult<usize> {
        let mut affected = 0usize;
        if archived {
            let mut stmt = tx
                .prepare(
                    "UPDATE memories SET consolidated_into = ?3
                     WHERE id = ?1 AND user_id = ?2 AND consolidated_into IS NULL",
                )
                .map_err(|e| to_storage_err("set_archived prepare", e))?;
            for id in ids {
                affected += stmt
                    .execute(params![id, user_id, TOMBSTONE_ID])
                    .map_err(|e| to_storage_err("set_archived", e))?;
            }
        } else {
            let mut stmt = tx
                .prepare(
                    "UPDATE memories SET consolidated_into = NULL
                     WHERE id = ?1 AND user_id = ?2 AND consolidated_into = ?3",
                )
                .map_err(|e| to_storage_err("set_archived prepare", e))?;
            for id in ids {
                affected += stmt
                    .execute(params![id, user_id, TOMBSTONE_ID])
                    .map_err(|e| to_storage_err("set_archived", e))?;
            }
        }
        Ok(affected)
    })();

    match result {
        Ok(n) => {
            tx.commit()
                .map_err(|e| to_storage_err("set_archived commit", e))?;
            Ok(n)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Overwrite strengths for a batch, one transaction.
pub fn update_strengths(conn: &Connection, updates: &[(String, f64)]) -> EngramResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("update_strengths begin", e))?;

    let result = (|| -> EngramResult<usize> {
        let mut affected = 0usize;
        let mut stmt = tx
            .prepare("UPDATE memories SET strength = ?2 WHERE id = ?1")
            .map_err(|e| to_storage_err("update_strengths prepare", e))?;
        for (id, strength) in updates {
            affected += stmt
                .execute(params![id, strength.clamp(0.0, 1.0)])
                .map_err(|e| to_storage_err("update_strengths", e))?;
        }
        Ok(affected)
    })();

    match result {
        Ok(n) => {
            tx.commit()
                .map_err(|e| to_storage_err("update_strengths commit", e))?;
            Ok(n)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Overwrite (salience, decay_rate) for a batch, one transaction.
pub fn downweight(conn: &Connection, updates: &[(String, f64, f64)]) -> EngramResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err("downweight begin", e))?;

    let result = (|| -> EngramResult<usize> {
        let mut affected = 0usize;
        let mut stmt = tx
            .prepare("UPDATE memories SET salience = ?2, decay_rate = ?3 WHERE id = ?1")
            .map_err(|e| to_storage_err("downweight prepare", e))?;
        for (id, salience, decay_rate) in updates {
            affected += stmt
                .execute(params![
                    id,
                    salience.clamp(0.0, 1.0),
                    decay_rate.clamp(0.0, 1.0)
                ])
                .map_err(|e| to_storage_err("downweight", e))?;
        }
        Ok(affected)
    })();

    match result {
        Ok(n) => {
            tx.commit()
                .map_err(|e| to_storage_err("downweight commit", e))?;
            Ok(n)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}
