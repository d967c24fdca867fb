pub mod health;
pub mod progress;
pub mod search;

pub use health::{
    ActiveConsolidation, AgeBuckets, ForgettingCandidateCounts, HealthSnapshot, Priority,
    Recommendation, RecommendationKind, RecommendedAction, StorageHealth,
};
pub use progress::{ConsolidationPhase, TaskKind, TaskProgress};
pub use search::{RankingMethod, SearchFilters, SearchHit, SearchQuery, SearchResponse};
