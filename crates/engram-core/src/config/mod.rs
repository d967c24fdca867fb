//! Configuration. One struct per subsystem, all `#[serde(default)]` so a
//! partial TOML file only overrides what it names.

pub mod consolidation_config;
pub mod decay_config;
pub mod defaults;
pub mod forgetting_config;
pub mod ranker_config;
pub mod storage_config;
pub mod timeout_config;

use serde::{Deserialize, Serialize};

pub use consolidation_config::ConsolidationConfig;
pub use decay_config::DecayConfig;
pub use forgetting_config::{ForgettingConfig, ForgettingWeights};
pub use ranker_config::{RankerConfig, RankerWeights, SectorCombine};
pub use storage_config::StorageConfig;
pub use timeout_config::TimeoutConfig;

/// Top-level configuration for the whole system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngramConfig {
    pub storage: StorageConfig,
    pub decay: DecayConfig,
    pub consolidation: ConsolidationConfig,
    pub forgetting: ForgettingConfig,
    pub ranker: RankerConfig,
    pub timeouts: TimeoutConfig,
}

impl EngramConfig {
    /// Parse from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
