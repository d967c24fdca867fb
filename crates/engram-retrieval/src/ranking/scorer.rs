//! The composite ranker.
//!
//! ```text
//! total = w_sim · similarity
//!       + w_sal · salience
//!       + w_rec · recency
//!       + w_lnk · link_weight
//! ```
//!
//! Selection is greedy: the link component of a candidate is the summed
//! weight of links pointing at it from results already chosen, capped at
//! 1.0, so each pick can promote its graph neighbors. Ties break by
//! descending salience, then ascending id — the order is fully determined
//! by (candidates, weights, now).

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};

use engram_core::config::RankerConfig;
use engram_core::memory::{Memory, MemoryLink};
use engram_core::models::{RankingMethod, SearchHit};

/// A candidate entering the ranker: the memory plus its combined sector
/// similarity.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub memory: Memory,
    pub similarity: f64,
}

/// Ranked hits plus whether the deadline cut the selection short.
#[derive(Debug)]
pub struct RankOutcome {
    pub hits: Vec<SearchHit>,
    pub timed_out: bool,
}

/// Rank candidates and keep the top `limit`.
///
/// The ranker never mutates store state; access bookkeeping is the caller's
/// choice.
pub fn rank(
    candidates: Vec<Candidate>,
    links: &[MemoryLink],
    config: &RankerConfig,
    method: RankingMethod,
    now: DateTime<Utc>,
    limit: usize,
    deadline: Option<Instant>,
) -> RankOutcome {
    match method {
        RankingMethod::Similarity => rank_by_similarity(candidates, limit),
        RankingMethod::Composite => {
            rank_composite(candidates, links, config, now, limit, deadline)
        }
    }
}

fn rank_by_similarity(mut candidates: Vec<Candidate>, limit: usize) -> RankOutcome {
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| tie_break(&a.memory, &b.memory))
    });
    candidates.truncate(limit);
    RankOutcome {
        hits: candidates
            .into_iter()
            .map(|c| SearchHit {
                score: c.similarity,
                similarity: c.similarity,
                memory: c.memory,
            })
            .collect(),
        timed_out: false,
    }
}

fn rank_composite(
    candidates: Vec<Candidate>,
    links: &[MemoryLink],
    config: &RankerConfig,
    now: DateTime<Utc>,
    limit: usize,
    deadline: Option<Instant>,
) -> RankOutcome {
    let w = &config.weights;
    let tau_ms = config.recency_tau_days * 24.0 * 3600.0 * 1000.0;

    // Outgoing adjacency over the candidate set, for the incremental link
    // bonus updates.
    let adjacency: HashMap<&str, Vec<(&str, f64)>> = {
        let mut adj: HashMap<&str, Vec<(&str, f64)>> = HashMap::new();
        for link in links {
            adj.entry(link.source_id.as_str())
                .or_default()
                .push((link.target_id.as_str(), link.weight.value()));
        }
        adj
    };

    struct Scored {
        candidate: Candidate,
        base: f64,
        link_bonus: f64,
    }

    let mut pool: Vec<Scored> = candidates
        .into_iter()
        .map(|c| {
            let m = &c.memory;
            let age_ms = (now - m.last_accessed).num_milliseconds().max(0) as f64;
            let recency = (-age_ms / tau_ms).exp();
            let base = w.similarity * c.similarity
                + w.salience * m.salience.value()
                + w.recency * recency;
            Scored {
                base,
                link_bonus: 0.0,
                candidate: c,
            }
        })
        .collect();

    let mut hits: Vec<SearchHit> = Vec::with_capacity(limit.min(pool.len()));
    let mut timed_out = false;

    while hits.len() < limit && !pool.is_empty() {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }
        }

        // Argmax over base + link component; ties by salience desc, id asc.
        let mut best = 0usize;
        let mut best_total = f64::NEG_INFINITY;
        for (i, s) in pool.iter().enumerate() {
            let total = s.base + w.link * s.link_bonus.min(1.0);
            let better = total > best_total
                || (total == best_total
                    && tie_break(&s.candidate.memory, &pool[best].candidate.memory)
                        == std::cmp::Ordering::Less);
            if better {
                best = i;
                best_total = total;
            }
        }

        let chosen = pool.swap_remove(best);

        // The chosen result promotes its graph neighbors still in the pool.
        if let Some(outgoing) = adjacency.get(chosen.candidate.memory.id.as_str()) {
            for (target, weight) in outgoing {
                for s in pool.iter_mut() {
                    if s.candidate.memory.id == *target {
                        s.link_bonus += weight;
                    }
                }
            }
        }

        hits.push(SearchHit {
            score: best_total,
            similarity: chosen.candidate.similarity,
            memory: chosen.candidate.memory,
        });
    }

    RankOutcome { hits, timed_out }
}

/// Canonical tie-break: descending salience, then ascending id.
fn tie_break(a: &Memory, b: &Memory) -> std::cmp::Ordering {
    b.salience
        .value()
        .partial_cmp(&a.salience.value())
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::{LinkType, Salience, Sector};

    fn candidate(id: &str, similarity: f64, salience: f64) -> Candidate {
        let mut m = Memory::new("u1", format!("content {id}"), Sector::Episodic);
        m.id = id.to_string();
        m.salience = Salience::new(salience);
        Candidate {
            memory: m,
            similarity,
        }
    }

    fn config() -> RankerConfig {
        RankerConfig::default()
    }

    #[test]
    fn higher_similarity_ranks_first() {
        let outcome = rank(
            vec![candidate("a", 0.2, 0.5), candidate("b", 0.9, 0.5)],
            &[],
            &config(),
            RankingMethod::Composite,
            Utc::now(),
            2,
            None,
        );
        assert_eq!(outcome.hits[0].memory.id, "b");
        assert!(!outcome.timed_out);
    }

    #[test]
    fn ties_break_by_salience_then_id() {
        let outcome = rank(
            vec![
                candidate("b", 0.5, 0.5),
                candidate("a", 0.5, 0.5),
                candidate("c", 0.5, 0.9),
            ],
            &[],
            &config(),
            RankingMethod::Composite,
            Utc::now(),
            3,
            None,
        );
        // c wins on salience; a beats b on id.
        let ids: Vec<&str> = outcome.hits.iter().map(|h| h.memory.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn link_bonus_promotes_neighbor_of_first_pick() {
        // b and c tie on everything; a→c link must put c ahead of b.
        let links = vec![MemoryLink::new("a", "c", LinkType::Related, 0.8)];
        let outcome = rank(
            vec![
                candidate("a", 0.9, 0.5),
                candidate("b", 0.5, 0.5),
                candidate("c", 0.5, 0.5),
            ],
            &links,
            &config(),
            RankingMethod::Composite,
            Utc::now(),
            3,
            None,
        );
        let ids: Vec<&str> = outcome.hits.iter().map(|h| h.memory.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let now = Utc::now();
        let build = || {
            vec![
                candidate("x", 0.4, 0.3),
                candidate("y", 0.41, 0.2),
                candidate("z", 0.39, 0.9),
            ]
        };
        let a = rank(build(), &[], &config(), RankingMethod::Composite, now, 3, None);
        let b = rank(build(), &[], &config(), RankingMethod::Composite, now, 3, None);
        let ids = |o: &RankOutcome| {
            o.hits
                .iter()
                .map(|h| h.memory.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn similarity_method_ignores_links() {
        let links = vec![MemoryLink::new("a", "b", LinkType::Related, 1.0)];
        let outcome = rank(
            vec![candidate("a", 0.9, 0.1), candidate("b", 0.1, 0.9)],
            &links,
            &config(),
            RankingMethod::Similarity,
            Utc::now(),
            2,
            None,
        );
        assert_eq!(outcome.hits[0].memory.id, "a");
        assert_eq!(outcome.hits[0].score, 0.9);
    }

    #[test]
    fn expired_deadline_returns_partial() {
        let deadline = Instant::now() - std::time::Duration::from_millis(1);
        let outcome = rank(
            vec![candidate("a", 0.9, 0.5), candidate("b", 0.5, 0.5)],
            &[],
            &config(),
            RankingMethod::Composite,
            Utc::now(),
            2,
            Some(deadline),
        );
        assert!(outcome.timed_out);
        assert!(outcome.hits.is_empty());
    }
}
