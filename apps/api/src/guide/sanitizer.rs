//! Raw response sanitizer — pulls one JSON object out of noisy generator output.
//!
//! The backend is asked for bare JSON but is never trusted to comply: fences,
//! leading prose and trailing chatter are all routine.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum MalformedResponseError {
    #[error("no JSON object in model output; snippet: {snippet:?}")]
    NoJsonObject { snippet: String },

    #[error("extracted span is not valid JSON: {reason}; snippet: {snippet:?}")]
    InvalidJson { reason: String, snippet: String },

    #[error("payload does not match the expected shape: {0}")]
    UnexpectedShape(String),
}

fn fence_regexes() -> &'static (Regex, Regex) {
    static FENCES: OnceLock<(Regex, Regex)> = OnceLock::new();
    FENCES.get_or_init(|| {
        (
            Regex::new(r"\A\s*```[\w-]*[ \t]*").expect("opening fence pattern is valid"),
            Regex::new(r"```\s*\z").expect("closing fence pattern is valid"),
        )
    })
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

/// Removes one fence pair wrapping the whole response. Fences inside the
/// payload (code samples in string values) are left alone.
fn strip_outer_fences(raw: &str) -> &str {
    let (opening, closing) = fence_regexes();
    let text = match opening.find(raw) {
        Some(m) => &raw[m.end()..],
        None => raw,
    };
    match closing.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Returns the span from the first `{` to the last `}` (inclusive, trimmed)
/// once any wrapping fence is removed. The span must parse as JSON.
pub fn sanitize(raw: &str) -> Result<String, MalformedResponseError> {
    let unfenced = strip_outer_fences(raw);

    let span = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => unfenced[start..=end].trim(),
        _ => {
            return Err(MalformedResponseError::NoJsonObject {
                snippet: snippet(raw),
            })
        }
    };

    serde_json::from_str::<serde_json::Value>(span).map_err(|e| {
        MalformedResponseError::InvalidJson {
            reason: e.to_string(),
            snippet: snippet(span),
        }
    })?;

    Ok(span.to_string())
}

/// Sanitizes then deserializes into `T`.
pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, MalformedResponseError> {
    let span = sanitize(raw)?;
    serde_json::from_str(&span).map_err(|e| MalformedResponseError::UnexpectedShape(e.to_string()))
}
