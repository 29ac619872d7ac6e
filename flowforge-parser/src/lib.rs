//! ABOUTME: Line-oriented extraction of labeled sections from a free-text workflow spec (§4.1)
//! ABOUTME: Produces soft diagnostics only — the Parser never fails a pipeline run

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use flowforge_utils::normalize_whitespace;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(workflow|description|inputs|steps|outputs)\s*:\s*(.*)$").unwrap()
});

static PARAM_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*([A-Za-z]+)\s*\)\s*:\s*(.*)$").unwrap()
});

static NUMBERED_STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SectionKind {
    Workflow,
    Description,
    Inputs,
    Steps,
    Outputs,
}

impl SectionKind {
    fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "workflow" => Self::Workflow,
            "description" => Self::Description,
            "inputs" => Self::Inputs,
            "steps" => Self::Steps,
            "outputs" => Self::Outputs,
            _ => return None,
        })
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Workflow => "Workflow",
            Self::Description => "Description",
            Self::Inputs => "Inputs",
            Self::Steps => "Steps",
            Self::Outputs => "Outputs",
        }
    }
}

/// One soft diagnostic produced by the Parser. Never causes a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub section: String,
    pub message: String,
}

impl ParseDiagnostic {
    fn new(section: &str, message: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            message: message.into(),
        }
    }
}

/// Raw labeled-section map handed to the Reasoner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSections {
    pub name: Option<String>,
    pub description: Option<String>,
    pub inputs_text: Option<String>,
    pub steps_text: Option<String>,
    pub outputs_text: Option<String>,
}

/// A single `- name (type): description` parameter line, already split apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParameter {
    pub name: String,
    pub type_hint: String,
    pub description: String,
}

/// A single `N. text` step, with any non-numbered continuation lines folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub sections: ParsedSections,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Extract labeled sections from `raw`, producing soft diagnostics for
/// missing/duplicate/empty sections but never failing outright.
#[must_use]
pub fn parse(raw: &str) -> ParseResult {
    let mut buffers: std::collections::HashMap<&'static str, Vec<String>> =
        std::collections::HashMap::new();
    let mut seen: std::collections::HashSet<&'static str> = std::collections::HashSet::new();
    let mut diagnostics = Vec::new();
    let mut current: Option<SectionKind> = None;

    for raw_line in raw.lines() {
        if let Some(caps) = LABEL_RE.captures(raw_line) {
            let label = caps[1].to_ascii_lowercase();
            let Some(kind) = SectionKind::from_label(&label) else {
                continue;
            };
            if !seen.insert(kind.name()) {
                diagnostics.push(ParseDiagnostic::new(
                    kind.name(),
                    format!("duplicate `{}:` section; later occurrence wins", kind.name()),
                ));
                buffers.entry(kind.name()).or_default().clear();
            }
            current = Some(kind);
            let rest = caps[2].trim();
            if !rest.is_empty() {
                buffers.entry(kind.name()).or_default().push(rest.to_string());
            }
            continue;
        }

        if raw_line.trim().is_empty() {
            current = None;
            continue;
        }

        if let Some(kind) = current {
            buffers
                .entry(kind.name())
                .or_default()
                .push(raw_line.trim_end().to_string());
        }
        // Lines before any recognized label are silently dropped.
    }

    let name = buffers
        .get("Workflow")
        .map(|lines| normalize_whitespace(&lines.join(" ")))
        .filter(|s| !s.is_empty());
    let description = buffers
        .get("Description")
        .map(|lines| normalize_whitespace(&lines.join(" ")))
        .filter(|s| !s.is_empty());
    let inputs_text = buffers.get("Inputs").map(|lines| lines.join("\n"));
    let steps_text = buffers.get("Steps").map(|lines| lines.join("\n"));
    let outputs_text = buffers.get("Outputs").map(|lines| lines.join("\n"));

    if name.is_none() {
        diagnostics.push(ParseDiagnostic::new("Workflow", "missing `Workflow:` section"));
    }
    if description.is_none() {
        diagnostics.push(ParseDiagnostic::new(
            "Description",
            "missing `Description:` section",
        ));
    }
    if inputs_text.is_none() {
        diagnostics.push(ParseDiagnostic::new("Inputs", "missing `Inputs:` section"));
    }
    match &steps_text {
        None => diagnostics.push(ParseDiagnostic::new("Steps", "missing `Steps:` section")),
        Some(text) if parse_numbered_steps(text).is_empty() => {
            diagnostics.push(ParseDiagnostic::new("Steps", "`Steps:` section has no numbered steps"));
        }
        Some(_) => {}
    }
    if outputs_text.is_none() {
        diagnostics.push(ParseDiagnostic::new("Outputs", "missing `Outputs:` section"));
    }

    ParseResult {
        sections: ParsedSections {
            name,
            description,
            inputs_text,
            steps_text,
            outputs_text,
        },
        diagnostics,
    }
}

/// Parse `- name (type): description` lines out of an Inputs/Outputs section body.
#[must_use]
pub fn parse_parameter_entries(section_text: &str) -> Vec<ParsedParameter> {
    section_text
        .lines()
        .filter_map(|line| PARAM_ENTRY_RE.captures(line.trim()))
        .map(|caps| ParsedParameter {
            name: caps[1].to_string(),
            type_hint: caps[2].to_ascii_lowercase(),
            description: caps[3].trim().to_string(),
        })
        .collect()
}

/// Parse `N. text` steps, folding non-numbered continuation lines into the
/// preceding step.
#[must_use]
pub fn parse_numbered_steps(section_text: &str) -> Vec<ParsedStep> {
    let mut steps: Vec<ParsedStep> = Vec::new();
    for line in section_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = NUMBERED_STEP_RE.captures(trimmed) {
            let index: u32 = caps[1].parse().unwrap_or(steps.len() as u32 + 1);
            steps.push(ParsedStep {
                index,
                text: caps[2].trim().to_string(),
            });
        } else if let Some(last) = steps.last_mut() {
            last.text.push(' ');
            last.text.push_str(trimmed);
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENTIAL_SPEC: &str = "Workflow: data_processing_pipeline\n\
Description: Process a customer and compute lifetime value\n\n\
Inputs:\n\
- customer_id (string): the customer identifier\n\n\
Steps:\n\
1. Fetch customer data from database using customer_id\n\
2. Validate customer data format\n\
3. Calculate lifetime value\n\n\
Outputs:\n\
- result (string): the computed value\n";

    #[test]
    fn parses_all_five_sections() {
        let result = parse(SEQUENTIAL_SPEC);
        assert_eq!(result.sections.name.as_deref(), Some("data_processing_pipeline"));
        assert!(result.sections.description.unwrap().contains("lifetime value"));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn extracts_input_parameter_entries() {
        let result = parse(SEQUENTIAL_SPEC);
        let params = parse_parameter_entries(&result.sections.inputs_text.unwrap());
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "customer_id");
        assert_eq!(params[0].type_hint, "string");
    }

    #[test]
    fn extracts_numbered_steps_in_order() {
        let result = parse(SEQUENTIAL_SPEC);
        let steps = parse_numbered_steps(&result.sections.steps_text.unwrap());
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].index, 1);
        assert!(steps[0].text.starts_with("Fetch customer data"));
    }

    #[test]
    fn continuation_lines_fold_into_previous_step() {
        let text = "1. Fetch order\n   and confirm it exists\n2. Process payment";
        let steps = parse_numbered_steps(text);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].text, "Fetch order and confirm it exists");
    }

    #[test]
    fn missing_sections_produce_soft_diagnostics_only() {
        let result = parse("Workflow: bare\n");
        assert!(result.sections.name.is_some());
        assert!(result.sections.description.is_none());
        assert!(!result.diagnostics.is_empty());
        // Soft: even with every other section missing, parse() itself never errors.
    }

    #[test]
    fn duplicate_sections_are_flagged() {
        let text = "Workflow: a\nWorkflow: b\nDescription: d\nInputs:\nSteps:\n1. x\nOutputs:\n";
        let result = parse(text);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.section == "Workflow" && d.message.contains("duplicate")));
        assert_eq!(result.sections.name.as_deref(), Some("b"));
    }

    #[test]
    fn empty_steps_section_is_flagged() {
        let text = "Workflow: a\nDescription: d\nInputs:\nSteps:\nOutputs:\n";
        let result = parse(text);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.section == "Steps" && d.message.contains("no numbered steps")));
    }
}
