//! The weighted forgetting score, with a per-factor breakdown for
//! observability.

use engram_core::config::ForgettingConfig;
use engram_core::memory::{Memory, MemoryMetadata};

use crate::context::ForgettingContext;
use crate::factors::{self, terms::GoalMatcher};

/// Every factor individually, plus the final weighted score.
#[derive(Debug, Clone)]
pub struct ForgettingBreakdown {
    pub base_importance: f64,
    pub emotional_significance: f64,
    pub context_relevance: f64,
    pub user_protection: f64,
    pub goal_alignment: f64,
    /// Weighted sum, weights normalized to 1.0. In [0, 1].
    pub score: f64,
}

/// Compute the forgetting score for one memory.
pub fn forgetting_score(
    memory: &Memory,
    metadata: &MemoryMetadata,
    config: &ForgettingConfig,
    ctx: &ForgettingContext,
    matcher: &GoalMatcher,
) -> ForgettingBreakdown {
    let weights = config.factor_weights.normalized();

    let base_importance = factors::base_importance::calculate(memory, config.importance_threshold);
    let emotional_significance = factors::emotional::calculate(metadata);
    let context_relevance = factors::context_relevance::calculate(metadata, ctx, matcher);
    let user_protection = factors::user_protection::calculate(memory, metadata, config, ctx);
    let goal_alignment = factors::goal_alignment::calculate(memory, ctx, matcher);

    let score = (weights.base_importance * base_importance
        + weights.emotional_significance * emotional_significance
        + weights.context_relevance * context_relevance
        + weights.user_protection * user_protection
        + weights.goal_alignment * goal_alignment)
        .clamp(0.0, 1.0);

    ForgettingBreakdown {
        base_importance,
        emotional_significance,
        context_relevance,
        user_protection,
        goal_alignment,
        score,
    }
}
