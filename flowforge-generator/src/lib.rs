//! ABOUTME: The Generator — walks a validated `WorkflowSpec` and emits a self-contained agent source file (§4.5)
//! ABOUTME: Emission is deterministic: same IR + same generator version -> byte-identical output (P4)

pub mod credentials;
pub mod emit;
pub mod runtime;
pub mod tools;
pub mod writer;

use chrono::{DateTime, Utc};
use flowforge_core::WorkflowSpec;

use writer::CodeWriter;

/// Generator version embedded in the emitted file's header comment. Bumped
/// whenever emission changes in a way that would alter P4's byte-identity
/// guarantee across versions (not within one).
pub const GENERATOR_VERSION: &str = "1.0.0";

/// Metadata returned alongside the generated source (§4.5 "Output").
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub code: String,
    pub code_size_bytes: usize,
    pub generated_at: DateTime<Utc>,
    pub workflow_name: String,
    pub confidence: f32,
}

/// Compile `spec` into a single self-contained Rust source file.
///
/// `generated_at` is supplied by the caller (the Orchestrator) rather than
/// read from the system clock here, keeping this function pure and its
/// output reproducible for P4 byte-identity tests.
#[must_use]
pub fn generate(spec: &WorkflowSpec, confidence: f32, generated_at: DateTime<Utc>) -> GeneratedArtifact {
    let tool_signatures = tools::collect_tool_signatures(&spec.workflow);

    let mut out = CodeWriter::new();
    emit_header(spec, confidence, generated_at, &mut out);
    out.line(runtime::RUNTIME_PRELUDE.trim_start_matches('\n'));
    out.line("");
    credentials::emit_credential_store(&spec.inputs, &mut out);
    out.line("");
    emit_routing_error(&mut out);
    out.line("");
    emit_agent_struct_and_tools(spec, &tool_signatures, &mut out);
    out.line("");
    emit_entry_method_wrapper(spec, &mut out);

    let code = out.finish();
    GeneratedArtifact {
        code_size_bytes: code.len(),
        code,
        generated_at,
        workflow_name: spec.name.clone(),
        confidence,
    }
}

fn emit_header(spec: &WorkflowSpec, confidence: f32, generated_at: DateTime<Utc>, out: &mut CodeWriter) {
    out.line(&format!("// Generated by flowforge {GENERATOR_VERSION}"));
    out.line(&format!("// workflow: {}", spec.name));
    out.line(&format!("// generated_at: {}", generated_at.to_rfc3339()));
    out.line(&format!("// confidence: {confidence}"));
    out.line("#![allow(dead_code, unused_variables, unused_mut)]");
    out.line("");
}

fn emit_routing_error(out: &mut CodeWriter) {
    out.line("#[derive(Debug, Clone, PartialEq, Eq)]");
    out.line("pub enum RoutingError {");
    out.indent();
    out.line("/// No routing rule matched and no default_workflow was configured (§4.5 part 3).");
    out.line("NoMatchingRoute,");
    out.dedent();
    out.line("}");
    out.line("");
    out.line("impl std::fmt::Display for RoutingError {");
    out.indent();
    out.line("fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {");
    out.indent();
    out.line("write!(f, \"no routing rule matched and no default_workflow was set\")");
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");
    out.line("");
    out.line("impl std::error::Error for RoutingError {}");
}

fn emit_agent_struct_and_tools(
    spec: &WorkflowSpec,
    tool_signatures: &[tools::ToolSignature],
    out: &mut CodeWriter,
) {
    out.line("pub struct Agent {");
    out.indent();
    out.line("pub credentials: CredentialStore,");
    out.dedent();
    out.line("}");
    out.line("");
    out.line("impl Agent {");
    out.indent();
    out.line("#[must_use]");
    out.line("pub fn new(credentials: CredentialStore) -> Self {");
    out.indent();
    out.line("Self { credentials }");
    out.dedent();
    out.line("}");

    // One stub method per unique tool_name, first-seen order (§4.5 part 5).
    for sig in tool_signatures {
        out.line("");
        out.line(&format!(
            "/// Stub for the `{}` tool. The business logic behind each step",
            sig.tool_name
        ));
        out.line("/// description is left unimplemented; see the call site comments below.");
        out.line(&format!(
            "pub fn {}(&self, kwargs: std::collections::HashMap<String, serde_json::Value>) -> serde_json::Value {{",
            sig.tool_name
        ));
        out.indent();
        out.line("serde_json::json!({\"status\": \"not_implemented\", \"data\": kwargs})");
        out.dedent();
        out.line("}");
    }

    out.line("");
    emit_entry_method_body(spec, out);
    out.dedent();
    out.line("}");
}

fn emit_entry_method_body(spec: &WorkflowSpec, out: &mut CodeWriter) {
    out.line("/// Execute the workflow. `inputs` supplies every declared non-credential");
    out.line("/// input by name; credentials come from `self.credentials` instead (§6).");
    out.line("pub fn execute(");
    out.indent();
    out.line("&self,");
    out.line("inputs: std::collections::HashMap<String, serde_json::Value>,");
    out.dedent();
    out.line(") -> Result<std::collections::HashMap<String, serde_json::Value>, RoutingError> {");
    out.indent();
    out.line("let mut scope: Scope = inputs;");
    for p in &spec.inputs {
        if p.is_credential {
            out.line(&format!(
                "scope.insert({:?}.to_string(), serde_json::Value::String(self.credentials.{}.clone()));",
                p.name, p.name
            ));
        }
    }
    out.line("");
    emit::emit_node(&spec.workflow, out);
    out.line("");
    out.line("let mut outputs = std::collections::HashMap::new();");
    for o in &spec.outputs {
        out.line(&format!(
            "if let Some(value) = scope.get({:?}) {{ outputs.insert({:?}.to_string(), value.clone()); }}",
            o.name, o.name
        ));
    }
    out.line("Ok(outputs)");
    out.dedent();
    out.line("}");
}

fn emit_entry_method_wrapper(spec: &WorkflowSpec, out: &mut CodeWriter) {
    out.line("#[cfg(test)]");
    out.line("mod generated_tests {");
    out.indent();
    out.line("use super::*;");
    out.line("");
    out.line("#[test]");
    out.line(&format!(
        "fn {}_constructs_from_env_credentials() {{",
        spec.name
    ));
    out.indent();
    out.line("let _agent = Agent::new(CredentialStore::load_from_env());");
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_core::{Node, Parameter, ParameterType};
    use std::collections::BTreeMap;

    fn fixed_timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn sample_spec() -> WorkflowSpec {
        WorkflowSpec {
            name: "data_processing_pipeline".to_string(),
            description: "desc".to_string(),
            version: "1.0.0".to_string(),
            inputs: vec![Parameter::new("customer_id", ParameterType::String, "id")],
            outputs: vec![Parameter::new("result", ParameterType::String, "out")],
            workflow: Node::ToolCall {
                tool_name: "fetch_customer_data".to_string(),
                parameters: BTreeMap::from([(
                    "id".to_string(),
                    serde_json::json!("{{customer_id}}"),
                )]),
                assigns_to: Some("result".to_string()),
            },
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn generates_expected_structure() {
        let artifact = generate(&sample_spec(), 0.95, fixed_timestamp());
        assert!(artifact.code.contains("pub struct Agent"));
        assert!(artifact.code.contains("pub fn fetch_customer_data"));
        assert!(artifact.code.contains("pub fn execute("));
        assert!(artifact.code.contains("not_implemented"));
        assert_eq!(artifact.workflow_name, "data_processing_pipeline");
        assert_eq!(artifact.code_size_bytes, artifact.code.len());
    }

    #[test]
    fn compilation_is_idempotent_for_identical_input() {
        let a = generate(&sample_spec(), 0.95, fixed_timestamp());
        let b = generate(&sample_spec(), 0.95, fixed_timestamp());
        assert_eq!(a.code, b.code);
    }

    #[test]
    fn credential_inputs_read_from_store_not_plain_scope() {
        let mut spec = sample_spec();
        spec.inputs.push(Parameter::new(
            "database_url",
            ParameterType::String,
            "dsn",
        ));
        let artifact = generate(&spec, 0.95, fixed_timestamp());
        assert!(artifact.code.contains("self.credentials.database_url.clone()"));
        assert!(!artifact.code.contains("inputs.get(\"database_url\")"));
    }
}
