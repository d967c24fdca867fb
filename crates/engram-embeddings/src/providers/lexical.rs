//! Deterministic lexical embedding provider.
//!
//! Hashes term frequencies into fixed-dimension buckets, once per sector
//! with a per-sector salt so the five vectors differ while staying
//! correlated for overlapping vocabulary. Not as semantically rich as a
//! neural model, but always available and fully reproducible.

use regex::Regex;
use std::collections::HashMap;

use engram_core::errors::EngramResult;
use engram_core::memory::{Sector, SectorVectors};
use engram_core::traits::IEmbeddingProvider;

/// Lexical feature-hashing provider.
pub struct LexicalProvider {
    dimensions: usize,
    token_pattern: Regex,
}

impl LexicalProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            // Compiled once; tokenization never recompiles per call.
            token_pattern: Regex::new(r"[A-Za-z0-9_]+").expect("static pattern"),
        }
    }

    /// Hash a salted term into a bucket index using FNV-1a.
    fn hash_term(term: &str, salt: u64, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325 ^ salt;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    /// A second independent hash decides the bucket's sign, which spreads
    /// collisions instead of always accumulating them.
    fn hash_sign(term: &str, salt: u64) -> f32 {
        let mut h: u64 = 0x84222325cbf29ce4 ^ salt.rotate_left(17);
        for b in term.as_bytes() {
            h = h.wrapping_mul(0x100000001b3);
            h ^= *b as u64;
        }
        if h & 1 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Per-sector salt. Distinct constants keep the five projections
    /// decorrelated.
    fn sector_salt(sector: Sector) -> u64 {
        match sector {
            Sector::Episodic => 0x45504953,
            Sector::Semantic => 0x53454d41,
            Sector::Procedural => 0x50524f43,
            Sector::Emotional => 0x454d4f54,
            Sector::Reflective => 0x5245464c,
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        self.token_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|t| t.len() >= 2)
            .collect()
    }

    /// Build one sector's vector from term frequencies.
    fn sector_vector(&self, tokens: &[String], sector: Sector) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            // Degenerate input: the all-zero vector is the only permitted
            // non-unit embedding.
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let salt = Self::sector_salt(sector);
        let total = tokens.len() as f32;
        for (term, count) in &tf {
            let freq = count / total;
            // IDF approximation: longer terms carry more signal.
            let idf = 1.0 + (term.len() as f32).ln();
            let bucket = Self::hash_term(term, salt, self.dimensions);
            vec[bucket] += Self::hash_sign(term, salt) * freq * idf;
        }

        // L2 normalize.
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl IEmbeddingProvider for LexicalProvider {
    fn embed(&self, text: &str) -> EngramResult<SectorVectors> {
        let tokens = self.tokenize(text);
        Ok(SectorVectors {
            episodic: self.sector_vector(&tokens, Sector::Episodic),
            semantic: self.sector_vector(&tokens, Sector::Semantic),
            procedural: self.sector_vector(&tokens, Sector::Procedural),
            emotional: self.sector_vector(&tokens, Sector::Emotional),
            reflective: self.sector_vector(&tokens, Sector::Reflective),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "lexical-fnv-v1"
    }

    fn is_available(&self) -> bool {
        true
    }
}
