//! Strict import validation over the raw JSON document. Collects every
//! violation with its field path instead of bailing at the first.

use serde_json::Value;

use engram_core::errors::{ValidationCollector, ValidationError};
use engram_core::memory::Sector;

/// Validate the shape of an import document. Returns all violations.
pub fn validate_document(doc: &Value) -> Result<(), ValidationError> {
    let mut collector = ValidationCollector::new();

    let Some(object) = doc.as_object() else {
        collector.push(
            "$",
            "not_object",
            "document must be a JSON object",
            "export documents are objects with version, user_id, memories",
        );
        return collector.finish();
    };

    if !object.get("version").is_some_and(Value::is_string) {
        collector.push(
            "version",
            "missing_or_wrong_type",
            "version must be a string",
            "use a document produced by export",
        );
    }
    if !object.get("user_id").is_some_and(Value::is_string) {
        collector.push(
            "user_id",
            "missing_or_wrong_type",
            "user_id must be a string",
            "set user_id to the owner of these memories",
        );
    }

    match object.get("memories") {
        Some(Value::Array(memories)) => {
            for (i, memory) in memories.iter().enumerate() {
                validate_memory(memory, i, &mut collector);
            }
        }
        _ => collector.push(
            "memories",
            "missing_or_wrong_type",
            "memories must be an array",
            "wrap the exported memories in an array",
        ),
    }

    collector.finish()
}

fn validate_memory(memory: &Value, index: usize, collector: &mut ValidationCollector) {
    let path = |field: &str| format!("memories[{index}].{field}");

    let Some(object) = memory.as_object() else {
        collector.push(
            format!("memories[{index}]"),
            "not_object",
            "each memory must be a JSON object",
            "remove non-object entries from memories",
        );
        return;
    };

    if !object.get("id").is_some_and(Value::is_string) {
        collector.push(
            path("id"),
            "missing_or_wrong_type",
            "id must be a string",
            "give every memory its stable id",
        );
    }
    if !object.get("content").is_some_and(Value::is_string) {
        collector.push(
            path("content"),
            "missing_or_wrong_type",
            "content must be a string",
            "provide the memory text as content",
        );
    }

    match object.get("primary_sector").and_then(Value::as_str) {
        Some(sector) if Sector::parse_name(sector).is_some() => {}
        Some(sector) => collector.push(
            path("primary_sector"),
            "invalid_sector",
            format!("{sector} is not one of the five sectors"),
            "use episodic, semantic, procedural, emotional, or reflective",
        ),
        None => collector.push(
            path("primary_sector"),
            "missing_or_wrong_type",
            "primary_sector must be a string",
            "use episodic, semantic, procedural, emotional, or reflective",
        ),
    }

    for numeric in ["strength", "salience"] {
        if let Some(value) = object.get(numeric) {
            if !value.is_number() {
                collector.push(
                    path(numeric),
                    "wrong_type",
                    format!("{numeric} must be a number when present"),
                    "use a value between 0 and 1",
                );
            }
        }
    }

    if let Some(tags) = object.get("tags") {
        if !tags.is_array() {
            collector.push(
                path("tags"),
                "wrong_type",
                "tags must be an array when present",
                "use an array of strings",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_document_passes() {
        let doc = json!({
            "version": "1.0.0",
            "user_id": "u1",
            "memories": [
                {"id": "a", "content": "text", "primary_sector": "episodic"}
            ]
        });
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let doc = json!({
            "memories": [
                {"content": 42, "primary_sector": "limbic", "strength": "high"}
            ]
        });
        let err = validate_document(&doc).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"version"));
        assert!(fields.contains(&"user_id"));
        assert!(fields.contains(&"memories[0].id"));
        assert!(fields.contains(&"memories[0].content"));
        assert!(fields.contains(&"memories[0].primary_sector"));
        assert!(fields.contains(&"memories[0].strength"));
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(validate_document(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn tags_must_be_an_array() {
        let doc = json!({
            "version": "1.0.0",
            "user_id": "u1",
            "memories": [
                {"id": "a", "content": "x", "primary_sector": "semantic", "tags": "oops"}
            ]
        });
        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "memories[0].tags");
    }
}
