// Shared prompt fragments.
// Each pipeline stage defines its own prompts alongside it (sourcing/prompts.rs).
// This file contains cross-cutting prompt fragments.

/// Appended to every stage's system prompt to enforce JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Builds a stage system prompt from its role description and the JSON-only rule.
pub fn with_json_only(stage_system: &str) -> String {
    format!("{stage_system}\n\n{JSON_ONLY_INSTRUCTION}")
}
