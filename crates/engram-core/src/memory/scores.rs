use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Activation strength clamped to [0.0, 1.0].
/// Monotone non-increasing under decay; raised only by explicit reinforcement.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Strength(f64);

impl Strength {
    /// Memories at or below this strength become forgetting candidates.
    pub const FORGETTING_FLOOR: f64 = 0.2;

    /// Create a new Strength, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this memory qualifies as a forgetting candidate.
    pub fn is_forgetting_candidate(self) -> bool {
        self.0 <= Self::FORGETTING_FLOOR
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Strength {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Strength> for f64 {
    fn from(s: Strength) -> Self {
        s.0
    }
}

impl Add for Strength {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl Sub for Strength {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.0 - rhs.0)
    }
}

impl Mul<f64> for Strength {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.0 * rhs)
    }
}

/// Salience (stored importance) clamped to [0.0, 1.0].
/// Adjusted by consolidation and forgetting down-weighting.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Salience(f64);

impl Salience {
    /// Below this, the base-importance forgetting factor is boosted.
    pub const LOW: f64 = 0.3;

    /// Create a new Salience, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_low(self) -> bool {
        self.0 < Self::LOW
    }
}

impl Default for Salience {
    fn default() -> Self {
        Self(0.5)
    }
}

impl fmt::Display for Salience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Salience {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Salience> for f64 {
    fn from(s: Salience) -> Self {
        s.0
    }
}

impl Mul<f64> for Salience {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.0 * rhs)
    }
}

/// Per-day strength loss rate, clamped to [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DecayRate(f64);

impl DecayRate {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for DecayRate {
    fn default() -> Self {
        Self(0.01)
    }
}

impl From<f64> for DecayRate {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Mul<f64> for DecayRate {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.0 * rhs)
    }
}

/// Link weight clamped to [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LinkWeight(f64);

impl LinkWeight {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for LinkWeight {
    fn default() -> Self {
        Self(0.5)
    }
}

impl From<f64> for LinkWeight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_clamps_out_of_range() {
        assert_eq!(Strength::new(1.7).value(), 1.0);
        assert_eq!(Strength::new(-0.3).value(), 0.0);
    }

    #[test]
    fn strength_sub_saturates_at_zero() {
        let s = Strength::new(0.2) - Strength::new(0.5);
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn salience_low_threshold() {
        assert!(Salience::new(0.1).is_low());
        assert!(!Salience::new(0.3).is_low());
    }
}
