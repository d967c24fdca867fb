use serde::{Deserialize, Serialize};

use super::defaults;

/// Decay subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Memories accessed within this many days are left alone.
    pub rate_floor_days: f64,
    /// Rows updated per transaction.
    pub batch_size: usize,
    /// Interval between decay runs (seconds).
    pub interval_secs: u64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            rate_floor_days: defaults::DEFAULT_DECAY_FLOOR_DAYS,
            batch_size: defaults::DEFAULT_DECAY_BATCH_SIZE,
            interval_secs: defaults::DEFAULT_DECAY_INTERVAL_SECS,
        }
    }
}
