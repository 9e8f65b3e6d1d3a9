// Shared prompt fragments.
// Each stage that needs LLM calls keeps its own prompts alongside it
// (see analysis::prompts). This file contains cross-cutting fragments only.

/// System prompt suffix that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Builds a system prompt from a persona line and the JSON-only suffix.
pub fn json_system(persona: &str) -> String {
    format!("{persona} {JSON_ONLY_INSTRUCTION}")
}
