//! # engram-storage
//!
//! SQLite persistence driver for the memory store. Single write connection
//! plus a read pool (WAL), versioned migrations, and query modules grouped
//! by concern. [`StorageEngine`] ties them together behind the
//! `IMemoryStorage` trait.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod retry;

pub use engine::StorageEngine;

use engram_core::errors::{EngramError, StorageError};

/// Map a low-level failure into a typed storage error naming the step.
pub(crate) fn to_storage_err(step: &str, e: impl std::fmt::Display) -> EngramError {
    let message = e.to_string();
    let lower = message.to_ascii_lowercase();
    let err = if lower.contains("unique constraint") || lower.contains("constraint failed") {
        StorageError::ConstraintViolation {
            step: step.to_string(),
            message,
        }
    } else if lower.contains("database is locked") || lower.contains("busy") {
        StorageError::Conflict {
            step: step.to_string(),
            attempts: 1,
            message,
        }
    } else if lower.contains("unable to open") || lower.contains("disk i/o") {
        StorageError::ConnectionLost { message }
    } else {
        StorageError::Sqlite {
            step: step.to_string(),
            message,
        }
    };
    EngramError::Storage(err)
}

/// Serialize an f32 slice into little-endian bytes for BLOB storage.
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

/// Deserialize little-endian BLOB bytes back into an f32 vector.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8], dims: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(dims);
    for chunk in bytes.chunks_exact(4).take(dims) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_blob_round_trips() {
        let v = vec![0.25f32, -1.5, 3.75];
        let bytes = f32_vec_to_bytes(&v);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_f32_vec(&bytes, 3), v);
    }

    #[test]
    fn constraint_message_maps_to_constraint_violation() {
        let err = to_storage_err("insert", "UNIQUE constraint failed: memories.id");
        assert!(matches!(
            err,
            EngramError::Storage(StorageError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn busy_message_maps_to_conflict() {
        let err = to_storage_err("update", "database is locked");
        assert!(err.is_retryable());
    }
}
