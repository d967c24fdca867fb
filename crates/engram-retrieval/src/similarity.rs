//! Combining per-sector probe results into one similarity per candidate.

use std::collections::HashMap;

use engram_core::config::SectorCombine;
use engram_core::memory::Sector;

/// Join the five per-sector probe outputs into a single similarity per
/// memory id. `Max` takes the best sector; `Mean` averages over all five,
/// counting sectors where the memory did not surface as zero.
pub fn combine_sector_sims(
    per_sector: &[(Sector, Vec<(String, f64)>)],
    combine: SectorCombine,
) -> HashMap<String, f64> {
    let mut out: HashMap<String, f64> = HashMap::new();
    match combine {
        SectorCombine::Max => {
            for (_, hits) in per_sector {
                for (id, sim) in hits {
                    let entry = out.entry(id.clone()).or_insert(0.0);
                    if *sim > *entry {
                        *entry = *sim;
                    }
                }
            }
        }
        SectorCombine::Mean => {
            for (_, hits) in per_sector {
                for (id, sim) in hits {
                    *out.entry(id.clone()).or_insert(0.0) += *sim;
                }
            }
            let denom = Sector::COUNT as f64;
            for v in out.values_mut() {
                *v /= denom;
            }
        }
    }
    out
}

/// Dot product over unit vectors, accumulated in f64.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probes() -> Vec<(Sector, Vec<(String, f64)>)> {
        vec![
            (Sector::Episodic, vec![("a".into(), 0.9), ("b".into(), 0.2)]),
            (Sector::Semantic, vec![("a".into(), 0.4), ("c".into(), 0.6)]),
        ]
    }

    #[test]
    fn max_takes_best_sector() {
        let combined = combine_sector_sims(&probes(), SectorCombine::Max);
        assert_eq!(combined["a"], 0.9);
        assert_eq!(combined["c"], 0.6);
    }

    #[test]
    fn mean_divides_by_all_sectors() {
        let combined = combine_sector_sims(&probes(), SectorCombine::Mean);
        assert!((combined["a"] - (0.9 + 0.4) / 5.0).abs() < 1e-12);
        assert!((combined["b"] - 0.2 / 5.0).abs() < 1e-12);
    }
}
