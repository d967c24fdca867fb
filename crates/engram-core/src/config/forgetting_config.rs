use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Forgetting subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgettingConfig {
    /// Minimum age (days since creation) before auto-forgetting applies.
    pub min_age_days: i64,
    /// Salience below this boosts the base-importance factor.
    pub importance_threshold: f64,
    /// Salience above this is never auto-forgotten.
    pub max_auto_forget_importance: f64,
    /// Categories exempt from auto-forgetting.
    pub protected_categories: BTreeSet<String>,
    /// Days an archived memory stays recoverable before purge.
    pub retention_window_days: i64,
    /// Interval between forgetting runs (seconds).
    pub interval_secs: u64,
    /// Score at or above which archival is taken (risk permitting).
    pub archive_score: f64,
    /// Score at or above which salience and decay rate are down-weighted.
    pub downweight_score: f64,
    /// Factor weights; normalized to sum 1 before use.
    pub factor_weights: ForgettingWeights,
}

/// Relative weights of the forgetting score factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgettingWeights {
    pub base_importance: f64,
    pub emotional_significance: f64,
    pub context_relevance: f64,
    pub user_protection: f64,
    pub goal_alignment: f64,
}

impl Default for ForgettingWeights {
    fn default() -> Self {
        Self {
            base_importance: 0.40,
            emotional_significance: 0.15,
            context_relevance: 0.20,
            user_protection: 0.50,
            goal_alignment: 0.25,
        }
    }
}

impl ForgettingWeights {
    /// Normalize so the weights sum to 1.0.
    pub fn normalized(&self) -> Self {
        let sum = self.base_importance
            + self.emotional_significance
            + self.context_relevance
            + self.user_protection
            + self.goal_alignment;
        if sum <= f64::EPSILON {
            return Self::default().normalized();
        }
        Self {
            base_importance: self.base_importance / sum,
            emotional_significance: self.emotional_significance / sum,
            context_relevance: self.context_relevance / sum,
            user_protection: self.user_protection / sum,
            goal_alignment: self.goal_alignment / sum,
        }
    }
}

impl Default for ForgettingConfig {
    fn default() -> Self {
        Self {
            min_age_days: defaults::DEFAULT_MIN_AGE_DAYS,
            importance_threshold: defaults::DEFAULT_IMPORTANCE_THRESHOLD,
            max_auto_forget_importance: defaults::DEFAULT_MAX_AUTO_FORGET_IMPORTANCE,
            protected_categories: BTreeSet::new(),
            retention_window_days: defaults::DEFAULT_RETENTION_WINDOW_DAYS,
            interval_secs: defaults::DEFAULT_FORGETTING_INTERVAL_SECS,
            archive_score: defaults::DEFAULT_ARCHIVE_SCORE,
            downweight_score: defaults::DEFAULT_DOWNWEIGHT_SCORE,
            factor_weights: ForgettingWeights::default(),
        }
    }
}
