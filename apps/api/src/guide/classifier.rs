//! Block classifier — imposes a closed set of kinds on loosely-typed blocks.
//!
//! Declared tag first, structural inference second. Among structural signals
//! the specific shapes (`stack_group`, `qa`) are checked before the generic
//! ones (`list`, `guide`), so a QA block that also carries `text` stays a QA.

use serde::{Deserialize, Serialize};

use crate::guide::model::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    StackGroup,
    Qa,
    List,
    Guide,
    Script,
    Generic,
}

impl BlockKind {
    /// Maps a declared `type` tag to a kind. Unknown tags return `None` and
    /// fall through to inference.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "stack_group" | "stackgroup" | "stack" => Some(Self::StackGroup),
            "qa" | "question" => Some(Self::Qa),
            "list" => Some(Self::List),
            "guide" => Some(Self::Guide),
            "script" => Some(Self::Script),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

const ANSWER_FIELDS: &[&str] = &["goodAnswer", "goodAnswerPoints", "badAnswer", "badAnswerPoints"];

pub fn classify(block: &Block) -> BlockKind {
    if let Some(kind) = block.kind_tag().and_then(BlockKind::from_tag) {
        return kind;
    }

    if block.has("stackName") && block.array("questions").is_some() {
        return BlockKind::StackGroup;
    }

    if block.has("question") && ANSWER_FIELDS.iter().any(|f| block.has(f)) {
        return BlockKind::Qa;
    }

    if block.str_list("items").is_some() {
        return BlockKind::List;
    }

    if block.str_list("points").is_some() || (block.has("text") && block.title().is_some()) {
        return BlockKind::Guide;
    }

    // `script` has no structural signature: it is indistinguishable from a guide.
    BlockKind::Generic
}
