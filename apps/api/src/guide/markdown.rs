//! Inline text parser: the only markup understood is `**bold**`.
//!
//! Output is a typed span list; nothing is ever re-interpreted as markup
//! downstream.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub emphasized: bool,
}

/// Free text split into lines of spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RichText {
    pub lines: Vec<Vec<Span>>,
}

impl RichText {
    /// Text with emphasis markers removed, lines joined by `\n`.
    pub fn plain(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn bold_regex() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

/// Parses one free-text field.
pub fn parse_inline(text: &str) -> RichText {
    RichText {
        lines: text.lines().map(parse_line).collect(),
    }
}

fn parse_line(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in bold_regex().captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_span(&mut spans, &line[cursor..whole.start()], false);
        push_span(&mut spans, inner.as_str(), true);
        cursor = whole.end();
    }
    push_span(&mut spans, &line[cursor..], false);

    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, emphasized: bool) {
    if !text.is_empty() {
        spans.push(Span {
            text: text.to_string(),
            emphasized,
        });
    }
}
