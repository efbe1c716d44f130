//! Refinement merger — appends a freshly generated section to a document.
//!
//! Append-only and all-or-nothing: the input document is never touched, and
//! the returned document shares every existing section with it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::guide::model::{blocks_from_values, non_blank, unique_id, Document, Section};

pub const DEFAULT_REFINEMENT_TITLE: &str = "New Refinement";
const REFINEMENT_ID_PREFIX: &str = "refine_";

#[derive(Debug, Error, PartialEq)]
pub enum RefinementMergeError {
    #[error("refinement payload is not a JSON object")]
    NotAnObject,

    #[error("refinement payload has no content array")]
    MissingContent,
}

/// Appends `payload` (`{ title, content }`) as a refinement section, with an id
/// derived from the current time.
pub fn merge_refinement(document: &Document, payload: Value) -> Result<Document, RefinementMergeError> {
    merge_refinement_at(document, payload, Utc::now())
}

pub fn merge_refinement_at(
    document: &Document,
    payload: Value,
    now: DateTime<Utc>,
) -> Result<Document, RefinementMergeError> {
    let Value::Object(mut payload) = payload else {
        return Err(RefinementMergeError::NotAnObject);
    };

    let content = match payload.remove("content") {
        Some(Value::Array(values)) => values,
        _ => return Err(RefinementMergeError::MissingContent),
    };

    let title = payload
        .get("title")
        .and_then(non_blank)
        .unwrap_or(DEFAULT_REFINEMENT_TITLE)
        .to_string();

    let base_id = format!("{REFINEMENT_ID_PREFIX}{}", now.timestamp_millis());
    let id = unique_id(&base_id, &document.section_ids());
    let content = blocks_from_values(content, &id);

    Ok(document.with_appended(Section {
        id,
        title,
        content,
        is_refinement: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    use crate::guide::industry::Industry;
    use crate::guide::model::GeneratedDocument;

    fn base_document() -> Document {
        let payload: GeneratedDocument = serde_json::from_value(json!({
            "meta": {"role": "Data Engineer", "generatedAt": "2026-10-16"},
            "sections": [
                {"id": "intro", "title": "Intro", "content": [{"type": "guide", "text": "Hi", "title": "T"}]},
                {"id": "technical", "title": "Deep Dive", "content": []}
            ]
        }))
        .unwrap();
        Document::from_generated(payload, Industry::Tech, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
            .unwrap()
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_merge_appends_and_preserves_prefix() {
        let doc = base_document();
        let payload = json!({"title": "Harder SQL", "content": [{"type": "qa", "question": "Window functions?"}]});
        let merged = merge_refinement_at(&doc, payload.clone(), at(1_700_000_000_000)).unwrap();

        assert_eq!(merged.sections().len(), doc.sections().len() + 1);
        for (before, after) in doc.sections().iter().zip(merged.sections()) {
            assert!(Arc::ptr_eq(before, after), "existing sections must be shared");
        }

        let added = merged.sections().last().unwrap();
        assert_eq!(added.id, "refine_1700000000000");
        assert_eq!(added.title, "Harder SQL");
        assert!(added.is_refinement);
        let expected: Vec<Value> = payload["content"].as_array().unwrap().clone();
        let actual: Vec<Value> = added
            .content
            .iter()
            .map(|b| serde_json::to_value(b).unwrap())
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(merged.meta(), doc.meta());
    }

    #[test]
    fn test_merge_does_not_touch_input() {
        let doc = base_document();
        let snapshot = doc.clone();
        let _ = merge_refinement_at(&doc, json!({"content": []}), at(1)).unwrap();
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn test_missing_title_gets_default() {
        let merged = merge_refinement_at(&base_document(), json!({"content": []}), at(5)).unwrap();
        assert_eq!(merged.sections().last().unwrap().title, DEFAULT_REFINEMENT_TITLE);
    }

    #[test]
    fn test_same_millisecond_ids_stay_unique() {
        let doc = base_document();
        let once = merge_refinement_at(&doc, json!({"content": []}), at(42)).unwrap();
        let twice = merge_refinement_at(&once, json!({"content": []}), at(42)).unwrap();
        let ids: Vec<_> = twice.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids[2..], ["refine_42", "refine_42_2"]);
    }

    #[test]
    fn test_non_object_content_entries_are_dropped_in_order() {
        let payload = json!({"title": "Mixed", "content": [
            {"type": "list", "items": ["Q1"]},
            "stray text",
            42,
            null,
            {"type": "guide", "points": ["p"]}
        ]});
        let merged = merge_refinement_at(&base_document(), payload, at(7)).unwrap();

        let actual: Vec<Value> = merged
            .sections()
            .last()
            .unwrap()
            .content
            .iter()
            .map(|b| serde_json::to_value(b).unwrap())
            .collect();
        assert_eq!(
            actual,
            vec![
                json!({"type": "list", "items": ["Q1"]}),
                json!({"type": "guide", "points": ["p"]})
            ]
        );
    }

    #[test]
    fn test_missing_content_is_merge_error() {
        let err = merge_refinement_at(&base_document(), json!({"title": "Oops"}), at(1)).unwrap_err();
        assert_eq!(err, RefinementMergeError::MissingContent);
    }

    #[test]
    fn test_non_array_content_is_merge_error() {
        let err =
            merge_refinement_at(&base_document(), json!({"content": "text"}), at(1)).unwrap_err();
        assert_eq!(err, RefinementMergeError::MissingContent);
    }

    #[test]
    fn test_non_object_payload_is_merge_error() {
        let err = merge_refinement_at(&base_document(), json!([1, 2]), at(1)).unwrap_err();
        assert_eq!(err, RefinementMergeError::NotAnObject);
    }
}
