//! Goal alignment factor: overlap between the memory's own content and the
//! active goals.

use engram_core::memory::Memory;

use super::terms::GoalMatcher;
use crate::context::ForgettingContext;

pub fn calculate(memory: &Memory, ctx: &ForgettingContext, matcher: &GoalMatcher) -> f64 {
    1.0 - matcher.overlap(&memory.content, &ctx.active_goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::Sector;

    #[test]
    fn aligned_content_resists_forgetting() {
        let matcher = GoalMatcher::new();
        let ctx = ForgettingContext {
            active_goals: vec!["improve search latency".to_string()],
            ..Default::default()
        };
        let aligned = Memory::new("u1", "profiling the search latency spike", Sector::Episodic);
        let stray = Memory::new("u1", "ordered new desk chairs", Sector::Episodic);

        assert!(calculate(&aligned, &ctx, &matcher) < calculate(&stray, &ctx, &matcher));
    }
}
