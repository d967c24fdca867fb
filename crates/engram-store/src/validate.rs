//! Request validation. Collects every violation with its field path.

use engram_core::constants::MAX_CONTENT_BYTES;
use engram_core::errors::{ValidationCollector, ValidationError};

use crate::requests::{CreateMemoryRequest, UpdatePatch};

pub fn validate_create(request: &CreateMemoryRequest) -> Result<(), ValidationError> {
    let mut collector = ValidationCollector::new();

    if request.user_id.trim().is_empty() {
        collector.push(
            "user_id",
            "empty",
            "user_id must be non-empty",
            "pass the tenant id this memory belongs to",
        );
    }
    if request.content.trim().is_empty() {
        collector.push(
            "content",
            "empty",
            "content must be non-empty",
            "provide the memory text",
        );
    }
    if request.content.len() > MAX_CONTENT_BYTES {
        collector.push(
            "content",
            "too_long",
            format!("content must be at most {MAX_CONTENT_BYTES} bytes"),
            "split oversized observations into separate memories",
        );
    }
    for (i, link) in request.links.iter().enumerate() {
        if link.target_id.trim().is_empty() {
            collector.push(
                format!("links[{i}].target_id"),
                "empty",
                "link target must be non-empty",
                "point the link at an existing memory id",
            );
        }
        if !(0.0..=1.0).contains(&link.weight) {
            collector.push(
                format!("links[{i}].weight"),
                "out_of_range",
                "weight must be within [0, 1]",
                "clamp the link weight",
            );
        }
    }

    collector.finish()
}

pub fn validate_patch(patch: &UpdatePatch) -> Result<(), ValidationError> {
    let mut collector = ValidationCollector::new();

    if let Some(content) = &patch.content {
        if content.trim().is_empty() {
            collector.push(
                "content",
                "empty",
                "content must be non-empty when set",
                "omit content to keep the existing text",
            );
        }
        if content.len() > MAX_CONTENT_BYTES {
            collector.push(
                "content",
                "too_long",
                format!("content must be at most {MAX_CONTENT_BYTES} bytes"),
                "split oversized observations into separate memories",
            );
        }
    }
    for (field, value) in [
        ("strength", patch.strength),
        ("salience", patch.salience),
        ("decay_rate", patch.decay_rate),
    ] {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                collector.push(
                    field,
                    "out_of_range",
                    format!("{field} must be within [0, 1]"),
                    "clamp the score",
                );
            }
        }
    }

    collector.finish()
}

pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::single(
            "user_id",
            "empty",
            "user_id must be non-empty",
            "pass the tenant id",
        ));
    }
    Ok(())
}
