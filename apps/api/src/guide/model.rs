//! Document model — the in-memory study guide: metadata plus ordered sections
//! of loosely-typed content blocks.
//!
//! A `Document` is never mutated once built. Refinements produce a new value
//! that shares every existing section through `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::guide::industry::Industry;
use crate::guide::sanitizer::MalformedResponseError;

pub const DEFAULT_ROLE: &str = "Interview Prep";
pub const UNTITLED_SECTION: &str = "Untitled";

/// Block fields that carry displayable content. `type` is a tag, not content.
pub const CONTENT_FIELDS: &[&str] = &[
    "title",
    "heading",
    "text",
    "points",
    "items",
    "question",
    "insight",
    "goodAnswer",
    "goodAnswerPoints",
    "badAnswer",
    "badAnswerPoints",
    "keywords",
    "stackName",
    "description",
    "questions",
    "answer",
    "answerPoints",
];

// ────────────────────────────────────────────────────────────────────────────
// Block
// ────────────────────────────────────────────────────────────────────────────

/// One displayable unit. The producer enforces no schema, so every accessor is
/// option-typed and blank strings read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(Map<String, Value>);

impl Block {
    /// Only JSON objects are blocks.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Non-blank string field, trimmed.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        non_blank(self.0.get(key)?)
    }

    /// Non-blank strings of an array field. A lone string reads as a
    /// one-element list; other member types are skipped.
    pub fn str_list(&self, key: &str) -> Option<Vec<&str>> {
        string_list(self.0.get(key)?)
    }

    /// Non-empty array field, whatever its members are.
    pub fn array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .filter(|items| items.iter().any(is_present))
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_present)
    }

    pub fn kind_tag(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// `title`, falling back to `heading`.
    pub fn title(&self) -> Option<&str> {
        self.str_field("title").or_else(|| self.str_field("heading"))
    }

    /// True when at least one recognised content field is non-empty.
    pub fn has_recognized_content(&self) -> bool {
        CONTENT_FIELDS.iter().any(|key| self.has(key))
    }
}

pub(crate) fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn string_list(value: &Value) -> Option<Vec<&str>> {
    let list: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(non_blank).collect(),
        other => non_blank(other).into_iter().collect(),
    };
    (!list.is_empty()).then_some(list)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => items.iter().any(is_present),
        Value::Object(map) => map.values().any(is_present),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Keeps object entries as blocks and drops (with a warning) anything else.
pub fn blocks_from_values(values: Vec<Value>, section: &str) -> Vec<Block> {
    let total = values.len();
    let blocks: Vec<Block> = values.into_iter().filter_map(Block::from_value).collect();
    if blocks.len() < total {
        warn!(
            "Dropped {} non-object content entries from section '{}'",
            total - blocks.len(),
            section
        );
    }
    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Section / Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub role: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: Vec<Block>,
    #[serde(default)]
    pub is_refinement: bool,
}

/// The generated guide. Section ids are unique; section order is display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    meta: Meta,
    sections: Vec<Arc<Section>>,
}

impl Document {
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn sections(&self) -> &[Arc<Section>] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Arc<Section>> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn first_section_id(&self) -> Option<&str> {
        self.sections.first().map(|s| s.id.as_str())
    }

    pub fn section_ids(&self) -> HashSet<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }

    /// New document with `section` appended. Existing sections are shared.
    pub(crate) fn with_appended(&self, section: Section) -> Document {
        let mut sections = self.sections.clone();
        sections.push(Arc::new(section));
        Document {
            meta: self.meta.clone(),
            sections,
        }
    }

    /// Builds a document from the initial-generation payload, normalising
    /// missing metadata and section identity against the industry template.
    pub fn from_generated(
        payload: GeneratedDocument,
        industry: Industry,
        today: NaiveDate,
    ) -> Result<Document, MalformedResponseError> {
        let meta = payload.meta.unwrap_or(Value::Null);
        let meta = Meta {
            role: meta
                .get("role")
                .and_then(non_blank)
                .unwrap_or(DEFAULT_ROLE)
                .to_string(),
            generated_at: meta
                .get("generatedAt")
                .and_then(non_blank)
                .map(String::from)
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        };

        let templates = industry.sections();
        let mut taken: HashSet<String> = HashSet::new();
        let mut sections = Vec::with_capacity(payload.sections.len());

        for (index, raw) in payload.sections.into_iter().enumerate() {
            let Value::Object(mut raw) = raw else {
                warn!("Dropped non-object section at index {index}");
                continue;
            };

            let declared_id = raw.get("id").and_then(non_blank).map(String::from);
            let base_id = declared_id.unwrap_or_else(|| {
                templates
                    .get(index)
                    .map(|t| t.id.to_string())
                    .filter(|id| !taken.contains(id))
                    .unwrap_or_else(|| format!("section_{}", index + 1))
            });
            let id = unique_id(&base_id, &taken);
            if id != base_id {
                warn!("Duplicate section id '{base_id}' renamed to '{id}'");
            }

            let title = raw
                .get("title")
                .and_then(non_blank)
                .map(String::from)
                .or_else(|| industry.template(&base_id).map(|t| t.title.to_string()))
                .unwrap_or_else(|| UNTITLED_SECTION.to_string());

            let content = match raw.remove("content") {
                Some(Value::Array(values)) => blocks_from_values(values, &id),
                Some(_) | None => {
                    warn!("Section '{id}' has no content array; rendering it empty");
                    Vec::new()
                }
            };

            taken.insert(id.clone());
            sections.push(Arc::new(Section {
                id,
                title,
                content,
                is_refinement: false,
            }));
        }

        if sections.is_empty() {
            return Err(MalformedResponseError::UnexpectedShape(
                "document has no sections".to_string(),
            ));
        }

        Ok(Document { meta, sections })
    }
}

/// `base` if free, otherwise `base_2`, `base_3`, …
pub(crate) fn unique_id<S>(base: &str, taken: &HashSet<S>) -> String
where
    S: std::hash::Hash + Eq + std::borrow::Borrow<str>,
{
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Wire payloads
// ────────────────────────────────────────────────────────────────────────────

/// Initial-generation payload as the backend sends it. Only `sections` is
/// structurally required; everything inside is validated leniently.
#[derive(Debug, Deserialize)]
pub struct GeneratedDocument {
    #[serde(default)]
    pub meta: Option<Value>,
    pub sections: Vec<Value>,
}
