use serde::{Deserialize, Serialize};

/// The five memory sectors. Every memory has a primary sector and one
/// embedding per sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// Events and experiences as they happened.
    Episodic,
    /// Facts and general knowledge.
    Semantic,
    /// How-to knowledge and procedures.
    Procedural,
    /// Affect-laden observations.
    Emotional,
    /// Self-referential reflections and insights.
    Reflective,
}

impl Sector {
    /// Total number of sectors.
    pub const COUNT: usize = 5;

    /// All variants, in canonical order.
    pub const ALL: [Sector; 5] = [
        Self::Episodic,
        Self::Semantic,
        Self::Procedural,
        Self::Emotional,
        Self::Reflective,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Episodic => "episodic",
            Sector::Semantic => "semantic",
            Sector::Procedural => "procedural",
            Sector::Emotional => "emotional",
            Sector::Reflective => "reflective",
        }
    }

    /// Parse from string name. Returns `None` for unknown names so callers
    /// can surface a validation error instead of silently defaulting.
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "episodic" => Some(Sector::Episodic),
            "semantic" => Some(Sector::Semantic),
            "procedural" => Some(Sector::Procedural),
            "emotional" => Some(Sector::Emotional),
            "reflective" => Some(Sector::Reflective),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
