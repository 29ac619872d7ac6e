//! ABOUTME: Pure prompt-construction helpers — no network access, trivially unit tested
//! ABOUTME: System prompt instructs the model to emit exactly one IR JSON object (§4.2)

use flowforge_parser::ParsedSections;

/// Tag embedded in the system prompt identifying which prompt revision produced a run.
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

#[must_use]
pub fn build_system_prompt(prompt_version: &str) -> String {
    format!(
        "You are the Spec-to-IR reasoner for a workflow compiler (prompt {prompt_version}). \
         Read the labeled sections of a natural-language workflow specification and emit a \
         single JSON object matching the WorkflowSpec schema: {{name, description, version, \
         inputs[], outputs[], workflow, metadata}}. The `workflow` field is a Node tagged union \
         with `type` one of tool_call, sequential, conditional, parallel, orchestrator. Respond \
         with raw JSON only — no prose, no markdown code fences."
    )
}

/// Assemble the user message: parsed sections plus any retry feedback.
#[must_use]
pub fn build_user_prompt(sections: &ParsedSections, feedback: &[String]) -> String {
    let mut parts = Vec::new();

    if let Some(name) = &sections.name {
        parts.push(format!("Workflow: {name}"));
    }
    if let Some(description) = &sections.description {
        parts.push(format!("Description: {description}"));
    }
    if let Some(inputs) = &sections.inputs_text {
        parts.push(format!("Inputs:\n{inputs}"));
    }
    if let Some(steps) = &sections.steps_text {
        parts.push(format!("Steps:\n{steps}"));
    }
    if let Some(outputs) = &sections.outputs_text {
        parts.push(format!("Outputs:\n{outputs}"));
    }

    if !feedback.is_empty() {
        parts.push("Previous attempt failed validation with these errors — fix all of them:".to_string());
        for (i, msg) in feedback.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, msg));
        }
    }

    parts.join("\n\n")
}
