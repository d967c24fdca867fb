//! Bounded retry with backoff for retryable storage conflicts.

use std::time::Duration;

use engram_core::constants::CONFLICT_RETRY_LIMIT;
use engram_core::errors::{EngramError, EngramResult, StorageError};

/// Run `f`, retrying conflicts up to the bounded limit with exponential
/// backoff. Non-retryable errors pass through on the first occurrence.
pub fn with_retry<T, F>(step: &str, mut f: F) -> EngramResult<T>
where
    F: FnMut() -> EngramResult<T>,
{
    let mut attempt: u32 = 0;
    loop {
        match f() {
            Err(e) if e.is_retryable() && attempt < CONFLICT_RETRY_LIMIT => {
                attempt += 1;
                tracing::debug!(step, attempt, "retrying after conflict");
                std::thread::sleep(Duration::from_millis(10u64 << attempt));
            }
            Err(e) if e.is_retryable() => {
                // Exhausted: surface the conflict with the attempt count.
                return Err(EngramError::Storage(StorageError::Conflict {
                    step: step.to_string(),
                    attempts: attempt + 1,
                    message: e.to_string(),
                }));
            }
            other => return other,
        }
    }
}
