//! The five forgetting factors, one module each. Every factor returns a
//! forgettability contribution in [0, 1] — higher means safer to forget.

pub mod base_importance;
pub mod context_relevance;
pub mod emotional;
pub mod goal_alignment;
pub mod user_protection;

/// Shared term matcher used by the goal-driven factors.
pub mod terms {
    use moka::sync::Cache;
    use regex::Regex;

    use engram_core::config::defaults::DEFAULT_MATCHER_CACHE_ENTRIES;

    /// Bounded cache of compiled goal matchers. Goal phrases repeat across
    /// runs; compiling per call would dominate the factor cost.
    pub struct GoalMatcher {
        cache: Cache<String, Regex>,
    }

    impl GoalMatcher {
        pub fn new() -> Self {
            Self {
                cache: Cache::new(DEFAULT_MATCHER_CACHE_ENTRIES),
            }
        }

        /// Fraction of goal phrases that match the text, in [0, 1].
        pub fn overlap(&self, text: &str, goals: &[String]) -> f64 {
            if goals.is_empty() {
                return 0.0;
            }
            let matched = goals
                .iter()
                .filter(|goal| self.matcher_for(goal).is_match(text))
                .count();
            matched as f64 / goals.len() as f64
        }

        fn matcher_for(&self, goal: &str) -> Regex {
            if let Some(hit) = self.cache.get(goal) {
                return hit;
            }
            // Word terms of the goal, matched case-insensitively as
            // alternatives.
            let terms: Vec<String> = goal
                .split_whitespace()
                .filter(|t| t.len() >= 3)
                .map(regex::escape)
                .collect();
            let pattern = if terms.is_empty() {
                // Degenerate goal: match nothing.
                "a^".to_string()
            } else {
                format!(r"(?i)\b({})\b", terms.join("|"))
            };
            let re = Regex::new(&pattern).unwrap_or_else(|_| Regex::new("a^").expect("static"));
            self.cache.insert(goal.to_string(), re.clone());
            re
        }
    }

    impl Default for GoalMatcher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn overlap_counts_matching_goals() {
            let m = GoalMatcher::new();
            let goals = vec!["database tuning".to_string(), "frontend polish".to_string()];
            let overlap = m.overlap("we tuned the database index", &goals);
            assert!((overlap - 0.5).abs() < 1e-9);
        }

        #[test]
        fn empty_goals_overlap_zero() {
            let m = GoalMatcher::new();
            assert_eq!(m.overlap("anything", &[]), 0.0);
        }
    }
}
