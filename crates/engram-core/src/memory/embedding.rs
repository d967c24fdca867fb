use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sector::Sector;

/// One stored embedding row: a single sector's vector for one memory.
/// Every committed memory has exactly five of these, one per sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorEmbedding {
    pub memory_id: String,
    pub sector: Sector,
    /// Fixed-dimension vector, L2-normalized to unit length, or all zeros
    /// when the input had no signal at all.
    pub vector: Vec<f32>,
    /// Identifier of the model that produced the vector.
    pub model_id: String,
    pub captured_at: DateTime<Utc>,
}

/// The full set of five per-sector vectors produced by an embedding provider
/// for a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorVectors {
    pub episodic: Vec<f32>,
    pub semantic: Vec<f32>,
    pub procedural: Vec<f32>,
    pub emotional: Vec<f32>,
    pub reflective: Vec<f32>,
}

impl SectorVectors {
    /// Borrow the vector for a given sector.
    pub fn get(&self, sector: Sector) -> &[f32] {
        match sector {
            Sector::Episodic => &self.episodic,
            Sector::Semantic => &self.semantic,
            Sector::Procedural => &self.procedural,
            Sector::Emotional => &self.emotional,
            Sector::Reflective => &self.reflective,
        }
    }

    /// Iterate (sector, vector) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Sector, &[f32])> + '_ {
        Sector::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    /// Dimension of the vectors. All five share one dimension.
    pub fn dimensions(&self) -> usize {
        self.episodic.len()
    }

    /// Materialize into stored embedding rows for the given memory.
    pub fn into_rows(
        self,
        memory_id: &str,
        model_id: &str,
        captured_at: DateTime<Utc>,
    ) -> Vec<SectorEmbedding> {
        Sector::ALL
            .iter()
            .map(|&sector| SectorEmbedding {
                memory_id: memory_id.to_string(),
                sector,
                vector: self.get(sector).to_vec(),
                model_id: model_id.to_string(),
                captured_at,
            })
            .collect()
    }
}

/// L2 norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Whether a vector is unit-length (±1e-6) or exactly all zeros — the only
/// two states a stored embedding may be in.
pub fn is_normalized_or_zero(v: &[f32]) -> bool {
    let norm = l2_norm(v);
    norm == 0.0 || (norm - 1.0).abs() <= 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(dim: usize) -> SectorVectors {
        let mut v = vec![0.0f32; dim];
        v[0] = 1.0;
        SectorVectors {
            episodic: v.clone(),
            semantic: v.clone(),
            procedural: v.clone(),
            emotional: v.clone(),
            reflective: v,
        }
    }

    #[test]
    fn into_rows_yields_five_sectors() {
        let rows = vectors(8).into_rows("m1", "test-model", Utc::now());
        assert_eq!(rows.len(), Sector::COUNT);
        let sectors: Vec<Sector> = rows.iter().map(|r| r.sector).collect();
        assert_eq!(sectors, Sector::ALL.to_vec());
    }

    #[test]
    fn unit_and_zero_vectors_pass_normalization_check() {
        assert!(is_normalized_or_zero(&[1.0, 0.0]));
        assert!(is_normalized_or_zero(&[0.0, 0.0]));
        assert!(!is_normalized_or_zero(&[0.5, 0.5]));
    }
}
