//! Context relevance factor: how closely the memory's descriptive metadata
//! tracks the user's active goals.

use engram_core::memory::MemoryMetadata;

use super::terms::GoalMatcher;
use crate::context::ForgettingContext;

pub fn calculate(
    metadata: &MemoryMetadata,
    ctx: &ForgettingContext,
    matcher: &GoalMatcher,
) -> f64 {
    // Joined descriptive text: category, context, keywords.
    let mut descriptive = String::new();
    if let Some(category) = &metadata.category {
        descriptive.push_str(category);
        descriptive.push(' ');
    }
    if let Some(context) = &metadata.context {
        descriptive.push_str(context);
        descriptive.push(' ');
    }
    for keyword in &metadata.keywords {
        descriptive.push_str(keyword);
        descriptive.push(' ');
    }

    let relevance = matcher.overlap(&descriptive, &ctx.active_goals);
    1.0 - relevance
}
