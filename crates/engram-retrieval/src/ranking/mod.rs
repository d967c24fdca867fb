pub mod scorer;

pub use scorer::{rank, Candidate, RankOutcome};
