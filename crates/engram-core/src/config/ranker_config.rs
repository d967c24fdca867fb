use serde::{Deserialize, Serialize};

use super::defaults;

/// How the five per-sector similarities combine into one similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectorCombine {
    /// Best sector wins.
    #[default]
    Max,
    /// Mean over all five sectors (absent probes count as zero).
    Mean,
}

/// Composite ranker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub weights: RankerWeights,
    /// Recency time constant in days.
    pub recency_tau_days: f64,
    pub sector_combine: SectorCombine,
}

/// Weights of the four composite score components. Defaults sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerWeights {
    pub similarity: f64,
    pub salience: f64,
    pub recency: f64,
    pub link: f64,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            similarity: defaults::DEFAULT_WEIGHT_SIMILARITY,
            salience: defaults::DEFAULT_WEIGHT_SALIENCE,
            recency: defaults::DEFAULT_WEIGHT_RECENCY,
            link: defaults::DEFAULT_WEIGHT_LINK,
        }
    }
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            weights: RankerWeights::default(),
            recency_tau_days: defaults::DEFAULT_RECENCY_TAU_DAYS,
            sector_combine: SectorCombine::default(),
        }
    }
}
