//! Pairwise cosine similarity over unit vectors.

use rayon::prelude::*;

/// Dot product in f64 accumulation. Inputs are unit vectors, so this is the
/// cosine similarity.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

/// Similarities of one seed against every other vector, in parallel.
pub fn against_seed(seed: &[f32], vectors: &[Vec<f32>]) -> Vec<f64> {
    vectors.par_iter().map(|v| cosine(seed, v)).collect()
}

/// Mean similarity over all unordered pairs. Zero for fewer than two
/// vectors.
pub fn mean_pairwise(vectors: &[&Vec<f32>]) -> f64 {
    let n = vectors.len();
    if n < 2 {
        return 0.0;
    }
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();
    let sum: f64 = pairs
        .par_iter()
        .map(|&(i, j)| cosine(vectors[i], vectors[j]))
        .sum();
    sum / pairs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_unit_vectors_have_cosine_one() {
        let v = vec![0.6f32, 0.8];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_cosine_zero() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mean_pairwise_of_identical_vectors_is_one() {
        let v = vec![1.0f32, 0.0];
        let refs = vec![&v, &v, &v];
        assert!((mean_pairwise(&refs) - 1.0).abs() < 1e-6);
    }
}
