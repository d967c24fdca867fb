use serde::{Deserialize, Serialize};

/// A single field-level validation failure.
///
/// Carries the field path, a stable code, the violated constraint, and a
/// suggested remediation — everything a caller needs to fix its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path to the offending field, e.g. `memories[3].primary_sector`.
    pub field: String,
    /// Stable machine-readable code, e.g. `empty`, `out_of_range`.
    pub code: String,
    /// The constraint that was violated.
    pub constraint: String,
    /// What the caller should do about it.
    pub remediation: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        constraint: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            constraint: constraint.into(),
            remediation: remediation.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.constraint, self.code)
    }
}

/// Malformed input. Non-retryable; surfaced to the caller with per-field
/// paths. Collects every violation found rather than failing on the first.
#[derive(Debug, thiserror::Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Single-violation convenience constructor.
    pub fn single(
        field: impl Into<String>,
        code: impl Into<String>,
        constraint: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, code, constraint, remediation)],
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations across a validation pass.
#[derive(Debug, Default)]
pub struct ValidationCollector {
    violations: Vec<FieldViolation>,
}

impl ValidationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        constraint: impl Into<String>,
        remediation: impl Into<String>,
    ) {
        self.violations
            .push(FieldViolation::new(field, code, constraint, remediation));
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Finish the pass: `Ok(())` when clean, the collected error otherwise.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }
}
