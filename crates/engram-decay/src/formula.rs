//! The decay rule.
//!
//! ```text
//! strength_new = max(0, strength_old − decay_rate · Δt_days)
//! ```
//!
//! Linear in elapsed days since last access, clamped at zero. Decay never
//! raises strength; reinforcement (on retrieval) is the only increase path.

use chrono::{DateTime, Utc};

use engram_core::memory::Memory;

/// Compute the decayed strength of a memory at `now`.
pub fn decayed_strength(memory: &Memory, now: DateTime<Utc>) -> f64 {
    let elapsed_days = elapsed_days(memory.last_accessed, now);
    (memory.strength.value() - memory.decay_rate.value() * elapsed_days).max(0.0)
}

/// Elapsed time in fractional days, never negative.
pub fn elapsed_days(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = (now - since).num_milliseconds();
    (ms.max(0) as f64) / (24.0 * 3600.0 * 1000.0)
}
