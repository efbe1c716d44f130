// Shared prompt fragments. Each feature that calls the LLM defines its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps every content block non-empty and render-friendly.
pub const CONTENT_BLOCK_INSTRUCTION: &str = "\
    Every object in a 'content' array MUST carry a 'type' and at least one of \
    'text', 'points', 'items', 'question' or 'questions'. Do NOT output empty objects. \
    Use concise bullet points. You may mark key phrases with **double asterisks**; \
    no other markdown is rendered.";
