//! ABOUTME: Strips optional markdown code fences from a raw LLM response before JSON parsing
//! ABOUTME: The Reasoner contract expects raw JSON but models frequently wrap it in ``` fences

/// Strip a leading/trailing ```` ```json ... ``` ```` or ```` ``` ... ``` ```` fence, if present.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence's opening line (e.g. `json`).
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}
