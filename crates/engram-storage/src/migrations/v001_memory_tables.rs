//! v001: memories, memory_metadata, memory_embeddings, memory_links.

use rusqlite::Connection;

use engram_core::errors::EngramResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> EngramResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL,
            session_id        TEXT,
            content           TEXT NOT NULL,
            primary_sector    TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            last_accessed     TEXT NOT NULL,
            access_count      INTEGER NOT NULL DEFAULT 0,
            strength          REAL NOT NULL DEFAULT 1.0,
            salience          REAL NOT NULL DEFAULT 0.5,
            decay_rate        REAL NOT NULL DEFAULT 0.01,
            is_atomic         INTEGER NOT NULL DEFAULT 1,
            parent_id         TEXT,
            consolidated_into TEXT,
            content_hash      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_user_sector   ON memories(user_id, primary_sector);
        CREATE INDEX IF NOT EXISTS idx_memories_user_created  ON memories(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_memories_user_strength ON memories(user_id, strength);
        CREATE INDEX IF NOT EXISTS idx_memories_user_accessed ON memories(user_id, last_accessed);

        CREATE TABLE IF NOT EXISTS memory_metadata (
            memory_id      TEXT PRIMARY KEY REFERENCES memories(id) ON DELETE CASCADE,
            keywords       TEXT NOT NULL DEFAULT '[]',
            tags           TEXT NOT NULL DEFAULT '[]',
            category       TEXT,
            context        TEXT,
            importance     REAL NOT NULL DEFAULT 0.5,
            emotional_tags TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS memory_embeddings (
            memory_id   TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
            sector      TEXT NOT NULL,
            vector      BLOB NOT NULL,
            dimensions  INTEGER NOT NULL,
            model_id    TEXT NOT NULL,
            captured_at TEXT NOT NULL,
            PRIMARY KEY (memory_id, sector)
        );

        CREATE INDEX IF NOT EXISTS idx_embeddings_sector ON memory_embeddings(sector);

        CREATE TABLE IF NOT EXISTS memory_links (
            source_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
            target_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
            link_type TEXT NOT NULL,
            weight    REAL NOT NULL DEFAULT 0.5,
            PRIMARY KEY (source_id, target_id, link_type)
        );

        CREATE INDEX IF NOT EXISTS idx_links_source ON memory_links(source_id);
        CREATE INDEX IF NOT EXISTS idx_links_target ON memory_links(target_id);
        ",
    )
    .map_err(|e| to_storage_err("v001_memory_tables", e))?;
    Ok(())
}
