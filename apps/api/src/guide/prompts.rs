// All LLM prompt constants for the guide module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System instruction for initial generation.
/// Replace: {industry_framing}, {json_only}, {content_instruction}, {section_plan}, {schema_json}
pub const GUIDE_SYSTEM_TEMPLATE: &str = r#"{industry_framing}
Your goal is to analyze the provided Job Description (JD), Candidate Resume, Company Info and Notes
and generate a comprehensive interview preparation guide.

{json_only}

{content_instruction}

SECTIONS (emit exactly these, in this order, with these ids and titles):
{section_plan}

BLOCK TYPES:
- "guide":       {"type":"guide","title":"...","text":"...","points":["..."]}
- "script":      {"type":"script","title":"...","text":"first-person script"}
- "qa":          {"type":"qa","question":"...","insight":"why it is asked","goodAnswerPoints":["..."],"badAnswerPoints":["..."],"keywords":["..."]}
- "list":        {"type":"list","title":"...","items":["question to ask"]}
- "stack_group": {"type":"stack_group","stackName":"Tool","description":"...","questions":[{"question":"...","answerPoints":["..."]}]}

Output JSON schema:
{schema_json}"#;

/// User payload for initial generation.
/// Replace: {jd}, {resume}, {company}, {notes}
pub const GUIDE_USER_TEMPLATE: &str = r#"JOB DESCRIPTION:
{jd}

CANDIDATE RESUME:
{resume}

COMPANY INFO:
{company}

USER NOTES:
{notes}

Generate the JSON response now."#;

/// System instruction for a refinement.
/// Replace: {industry_framing}, {role}, {existing_sections}, {query}, {json_only}, {content_instruction}
pub const REFINEMENT_SYSTEM_TEMPLATE: &str = r#"{industry_framing}
You are a strict Interview Coach. The candidate wants to REFINE their prep.

CONTEXT:
Role: {role}
Sections already in the guide: {existing_sections}

USER REQUEST: "{query}"

INSTRUCTIONS:
1. Generate ONE new section of content based strictly on the request. Do not repeat existing sections.
2. Output MUST be a JSON object with a "title" and a "content" array.
3. For questions, prefer "type": "qa" with goodAnswerPoints and badAnswerPoints.

{json_only}

{content_instruction}

Output JSON schema:
{"title": "Title for this new section", "content": [ ... blocks ... ]}"#;

/// User payload for a refinement.
pub const REFINEMENT_USER_PROMPT: &str = "Generate the refinement section now.";
