//! Block renderer — a pure projection from classified blocks to display trees.
//!
//! One strategy per `BlockKind`. Missing optional fields never fail a render;
//! a block with nothing to show under its kind is skipped rather than shown as
//! an empty card. The same projection drives the on-screen section view and
//! the print export.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::guide::classifier::{classify, BlockKind};
use crate::guide::markdown::{parse_inline, RichText};
use crate::guide::model::{non_blank, string_list, Block, Document, Section};

/// Fields that are tags or identity, never content, in the generic fallback.
const GENERIC_SKIPPED_FIELDS: &[&str] = &["type", "id"];
/// Consumed by a block-level question in the generic fallback.
const SIMPLE_QUESTION_FIELDS: &[&str] = &["question", "answer", "answerPoints"];

// ────────────────────────────────────────────────────────────────────────────
// Display tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayNode {
    StackGroup {
        stack_name: Option<RichText>,
        description: Option<RichText>,
        questions: Vec<StackQuestion>,
    },
    Qa {
        question: Option<RichText>,
        text: Option<RichText>,
        good: Option<Approach>,
        /// Absent when the block carries no bad-answer field at all.
        bad: Option<Approach>,
        keywords: Vec<String>,
    },
    List {
        title: Option<RichText>,
        items: Vec<QuotedItem>,
    },
    Guide {
        title: Option<RichText>,
        text: Option<RichText>,
        points: Vec<RichText>,
    },
    Script {
        title: Option<RichText>,
        text: Option<RichText>,
    },
    /// Anything else: question/answer pairs first, then every remaining
    /// scalar field as its own line.
    Generic {
        questions: Vec<StackQuestion>,
        lines: Vec<GenericLine>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackQuestion {
    pub number: usize,
    pub question: RichText,
    pub answer_points: Vec<RichText>,
}

/// One column of a QA layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Points(Vec<RichText>),
    Text(RichText),
}

/// A list item with its own double quotes stripped; the renderer quotes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotedItem {
    pub text: RichText,
}

impl QuotedItem {
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.text.plain())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericLine {
    pub field: String,
    pub text: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub is_refinement: bool,
    pub blocks: Vec<DisplayNode>,
}

/// Static, non-interactive projection of the whole document for print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportView {
    pub role: String,
    pub generated_at: String,
    pub sections: Vec<SectionView>,
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

pub fn render_block(block: &Block) -> Option<DisplayNode> {
    if !block.has_recognized_content() {
        return None;
    }

    match classify(block) {
        BlockKind::StackGroup => render_stack_group(block),
        BlockKind::Qa => render_qa(block),
        BlockKind::List => render_list(block),
        BlockKind::Guide => render_guide(block),
        BlockKind::Script => render_script(block),
        BlockKind::Generic => render_generic(block),
    }
}

pub fn render_blocks(blocks: &[Block]) -> Vec<DisplayNode> {
    blocks.iter().filter_map(render_block).collect()
}

pub fn render_section(section: &Section) -> SectionView {
    SectionView {
        id: section.id.clone(),
        title: section.title.clone(),
        is_refinement: section.is_refinement,
        blocks: render_blocks(&section.content),
    }
}

/// Every section, in document order. Needs no backend call.
pub fn render_document(document: &Document) -> ExportView {
    ExportView {
        role: document.meta().role.clone(),
        generated_at: document.meta().generated_at.clone(),
        sections: document
            .sections()
            .iter()
            .map(|s| render_section(s))
            .collect(),
    }
}

fn rich(block: &Block, key: &str) -> Option<RichText> {
    block.str_field(key).map(parse_inline)
}

fn rich_list(block: &Block, key: &str) -> Option<Vec<RichText>> {
    block
        .str_list(key)
        .map(|items| items.into_iter().map(parse_inline).collect())
}

fn render_stack_group(block: &Block) -> Option<DisplayNode> {
    let stack_name = block
        .str_field("stackName")
        .or_else(|| block.title())
        .map(parse_inline);
    let description = rich(block, "description");

    let questions = numbered(
        block
            .array("questions")
            .map(|entries| entries.iter().filter_map(stack_question).collect())
            .unwrap_or_default(),
    );

    if stack_name.is_none() && description.is_none() && questions.is_empty() {
        return None;
    }

    Some(DisplayNode::StackGroup {
        stack_name,
        description,
        questions,
    })
}

/// `{question, answerPoints | answer}` or a bare question string.
fn stack_question(entry: &Value) -> Option<(RichText, Vec<RichText>)> {
    if let Some(question) = non_blank(entry) {
        return Some((parse_inline(question), Vec::new()));
    }

    question_with_answers(|key| entry.get(key))
}

/// `question` with `answerPoints`, else `answer` as a one-element list.
fn question_with_answers<'a>(
    field: impl Fn(&str) -> Option<&'a Value>,
) -> Option<(RichText, Vec<RichText>)> {
    let question = field("question").and_then(non_blank)?;
    let answers = field("answerPoints")
        .and_then(string_list)
        .or_else(|| field("answer").and_then(non_blank).map(|a| vec![a]))
        .unwrap_or_default();

    Some((
        parse_inline(question),
        answers.into_iter().map(parse_inline).collect(),
    ))
}

fn numbered(questions: Vec<(RichText, Vec<RichText>)>) -> Vec<StackQuestion> {
    questions
        .into_iter()
        .enumerate()
        .map(|(i, (question, answer_points))| StackQuestion {
            number: i + 1,
            question,
            answer_points,
        })
        .collect()
}

fn render_qa(block: &Block) -> Option<DisplayNode> {
    let question = rich(block, "question");
    let text = rich(block, "text");

    let good = rich_list(block, "goodAnswerPoints")
        .map(Approach::Points)
        .or_else(|| rich(block, "goodAnswer").map(Approach::Text))
        .or_else(|| rich(block, "insight").map(Approach::Text));

    let bad = rich_list(block, "badAnswerPoints")
        .map(Approach::Points)
        .or_else(|| rich(block, "badAnswer").map(Approach::Text));

    let keywords: Vec<String> = block
        .str_list("keywords")
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect();

    if question.is_none() && text.is_none() && good.is_none() && bad.is_none() {
        return None;
    }

    Some(DisplayNode::Qa {
        question,
        text,
        good,
        bad,
        keywords,
    })
}

fn render_list(block: &Block) -> Option<DisplayNode> {
    let title = block.title().map(parse_inline);
    let items: Vec<QuotedItem> = block
        .str_list("items")
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.replace('"', ""))
        .filter(|item| !item.trim().is_empty())
        .map(|item| QuotedItem {
            text: parse_inline(item.trim()),
        })
        .collect();

    if title.is_none() && items.is_empty() {
        return None;
    }

    Some(DisplayNode::List { title, items })
}

fn render_guide(block: &Block) -> Option<DisplayNode> {
    let title = block.title().map(parse_inline);
    let text = rich(block, "text");
    let points = rich_list(block, "points").unwrap_or_default();

    if title.is_none() && text.is_none() && points.is_empty() {
        return None;
    }

    Some(DisplayNode::Guide {
        title,
        text,
        points,
    })
}

fn render_script(block: &Block) -> Option<DisplayNode> {
    let title = block.title().map(parse_inline);
    let text = rich(block, "text");

    if title.is_none() && text.is_none() {
        return None;
    }

    Some(DisplayNode::Script { title, text })
}

fn render_generic(block: &Block) -> Option<DisplayNode> {
    let mut questions = Vec::new();
    let mut consumed: Vec<&str> = GENERIC_SKIPPED_FIELDS.to_vec();

    if let Some(own) = question_with_answers(|key| block.get(key)) {
        questions.push(own);
        consumed.extend_from_slice(SIMPLE_QUESTION_FIELDS);
    }

    let nested: Vec<_> = block
        .array("questions")
        .map(|entries| entries.iter().filter_map(stack_question).collect())
        .unwrap_or_default();
    if !nested.is_empty() {
        questions.extend(nested);
        consumed.push("questions");
    }

    let lines: Vec<GenericLine> = block
        .fields()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .flat_map(|(key, value)| {
            let mut texts = Vec::new();
            scalar_texts(value, &mut texts);
            texts.into_iter().map(move |text| GenericLine {
                field: key.clone(),
                text: parse_inline(&text),
            })
        })
        .collect();

    if questions.is_empty() && lines.is_empty() {
        return None;
    }

    Some(DisplayNode::Generic {
        questions: numbered(questions),
        lines,
    })
}

/// Every non-blank string, number and bool under `value`, depth first.
fn scalar_texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Array(items) => items.iter().for_each(|item| scalar_texts(item, out)),
        Value::Object(map) => map.values().for_each(|item| scalar_texts(item, out)),
        Value::String(_) | Value::Null => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plain-text print layout
// ────────────────────────────────────────────────────────────────────────────

const RULE: &str = "==============================================================";

impl ExportView {
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.role)?;
        writeln!(f, "Interview Prep Guide • {}", self.generated_at)?;
        writeln!(f, "{RULE}")?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title.to_uppercase())?;
            writeln!(f, "{}", "-".repeat(section.title.chars().count().max(3)))?;
            for node in &section.blocks {
                writeln!(f)?;
                write!(f, "{node}")?;
            }
        }
        Ok(())
    }
}

fn indented(text: &RichText, indent: &str) -> String {
    text.plain().replace('\n', &format!("\n{indent}"))
}

fn write_approach(f: &mut fmt::Formatter<'_>, label: &str, approach: &Approach) -> fmt::Result {
    writeln!(f, "{label}")?;
    match approach {
        Approach::Points(points) => {
            for point in points {
                writeln!(f, "  • {}", indented(point, "    "))?;
            }
        }
        Approach::Text(text) => writeln!(f, "  {}", indented(text, "  "))?,
    }
    Ok(())
}

fn write_questions(f: &mut fmt::Formatter<'_>, questions: &[StackQuestion]) -> fmt::Result {
    for q in questions {
        writeln!(f, "{}. {}", q.number, indented(&q.question, "   "))?;
        for answer in &q.answer_points {
            writeln!(f, "   • {}", indented(answer, "     "))?;
        }
    }
    Ok(())
}

impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayNode::StackGroup {
                stack_name,
                description,
                questions,
            } => {
                if let Some(name) = stack_name {
                    writeln!(f, "[{}]", name.plain())?;
                }
                if let Some(description) = description {
                    writeln!(f, "{}", description.plain())?;
                }
                write_questions(f, questions)?;
            }
            DisplayNode::Qa {
                question,
                text,
                good,
                bad,
                keywords,
            } => {
                if let Some(question) = question {
                    writeln!(f, "Q: {}", indented(question, "   "))?;
                }
                if let Some(text) = text {
                    writeln!(f, "{}", text.plain())?;
                }
                if let Some(good) = good {
                    write_approach(f, "✓ Good approach:", good)?;
                }
                if let Some(bad) = bad {
                    write_approach(f, "✗ Bad approach:", bad)?;
                }
                if !keywords.is_empty() {
                    writeln!(f, "Keywords: {}", keywords.join(", "))?;
                }
            }
            DisplayNode::List { title, items } => {
                if let Some(title) = title {
                    writeln!(f, "{}", title.plain())?;
                }
                for item in items {
                    writeln!(f, "  ? {}", item.quoted())?;
                }
            }
            DisplayNode::Guide {
                title,
                text,
                points,
            } => {
                if let Some(title) = title {
                    writeln!(f, "{}", title.plain())?;
                }
                if let Some(text) = text {
                    writeln!(f, "{}", text.plain())?;
                }
                for point in points {
                    writeln!(f, "  • {}", indented(point, "    "))?;
                }
            }
            DisplayNode::Script { title, text } => {
                if let Some(title) = title {
                    writeln!(f, "{}", title.plain())?;
                }
                if let Some(text) = text {
                    for line in text.plain().lines() {
                        writeln!(f, "  > {line}")?;
                    }
                }
            }
            DisplayNode::Generic { questions, lines } => {
                write_questions(f, questions)?;
                for line in lines {
                    writeln!(f, "{}", line.text.plain())?;
                }
            }
        }
        Ok(())
    }
}
