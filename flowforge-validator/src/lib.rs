//! ABOUTME: The Validator — referential-integrity, scope, and safety checks over candidate IR (§4.3)
//! ABOUTME: Collects every violation rather than stopping at the first, so retry feedback is complete (P9)

pub mod condition;
pub mod scope;

use std::collections::BTreeSet;

use flowforge_core::ident::{is_valid_identifier, looks_like_credential, RESERVED_TOOL_NAMES};
use flowforge_core::{Node, Parameter, ValidationError, ValidationWarning, WorkflowSpec};
use flowforge_utils::{extract_variable_refs, has_dotted_variable_ref};

use scope::Scope;

struct Ctx {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Ctx {
    fn error(&mut self, path: impl Into<String>, code: &str, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, code, message));
    }

    fn warn(&mut self, path: impl Into<String>, code: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            code: code.into(),
            message: message.into(),
        });
    }
}

/// Deserialize and validate a candidate IR, enforcing every invariant in §3.5.
///
/// On success returns the spec (with `is_credential` deterministically
/// recomputed from parameter names) plus any non-fatal warnings. On failure
/// returns every violation found — the caller feeds these back to the
/// Reasoner verbatim rather than stopping at the first one.
pub fn validate(candidate: &serde_json::Value) -> Result<(WorkflowSpec, Vec<ValidationWarning>), Vec<ValidationError>> {
    let mut spec: WorkflowSpec = match serde_json::from_value(candidate.clone()) {
        Ok(spec) => spec,
        Err(e) => {
            return Err(vec![ValidationError::new(
                "$",
                "SCHEMA_ERROR",
                format!("candidate does not match the WorkflowSpec schema: {e}"),
            )])
        }
    };

    let mut ctx = Ctx {
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    if !is_valid_identifier(&spec.name) {
        ctx.error("name", "INVALID_IDENTIFIER", format!("`{}` is not a valid identifier", spec.name));
    }

    check_unique_and_valid(&mut ctx, "inputs", &spec.inputs);
    check_unique_and_valid(&mut ctx, "outputs", &spec.outputs);

    // Invariant 10: is_credential is deterministic, never trusted from the model.
    for input in &mut spec.inputs {
        input.is_credential = looks_like_credential(&input.name);
    }

    let root_scope = Scope::from_names(spec.inputs.iter().map(|p| p.name.clone()));
    validate_node(&spec.workflow, "workflow", &root_scope, &mut ctx);

    if ctx.errors.is_empty() {
        Ok((spec, ctx.warnings))
    } else {
        Err(ctx.errors)
    }
}

fn check_unique_and_valid(ctx: &mut Ctx, list_path: &str, params: &[Parameter]) {
    let mut seen = BTreeSet::new();
    for p in params {
        let path = format!("{list_path}.{}", p.name);
        if !is_valid_identifier(&p.name) {
            ctx.error(path.clone(), "INVALID_IDENTIFIER", format!("`{}` is not a valid identifier", p.name));
        }
        if !seen.insert(p.name.clone()) {
            ctx.error(path, "DUPLICATE_NAME", format!("duplicate parameter name `{}`", p.name));
        }
    }
}

/// Check `text` for referenced variables, raising `NESTED_ACCESS` for dotted
/// access and `UNKNOWN_VARIABLE` for any name not present in `scope`.
fn check_var_refs(ctx: &mut Ctx, path: &str, text: &str, scope: &Scope) {
    if has_dotted_variable_ref(text) {
        ctx.error(
            path.to_string(),
            "NESTED_ACCESS",
            format!("`{text}` uses a dotted/indexed variable reference, which is not allowed"),
        );
        return;
    }
    for name in extract_variable_refs(text) {
        if !scope.contains(&name) {
            ctx.error(
                path.to_string(),
                "UNKNOWN_VARIABLE",
                format!("`{{{{{name}}}}}` is not in scope at this point in the workflow"),
            );
        }
    }
}

fn check_condition(ctx: &mut Ctx, path: &str, condition: &str, scope: &Scope) {
    if let Err(reason) = condition::check_condition_safety(condition) {
        ctx.error(path.to_string(), "UNSAFE_CONDITION", reason);
        return;
    }
    check_var_refs(ctx, path, condition, scope);
}

/// Walk one node, returning the set of variable names it guarantees are bound
/// for whatever follows it in its parent's scope (its "delta").
fn validate_node(node: &Node, path: &str, scope: &Scope, ctx: &mut Ctx) -> Scope {
    match node {
        Node::ToolCall {
            tool_name,
            parameters,
            assigns_to,
        } => {
            if !is_valid_identifier(tool_name) {
                ctx.error(
                    format!("{path}.tool_name"),
                    "INVALID_IDENTIFIER",
                    format!("`{tool_name}` is not a valid identifier"),
                );
            } else if RESERVED_TOOL_NAMES.contains(&tool_name.as_str()) {
                ctx.error(
                    format!("{path}.tool_name"),
                    "RESERVED_TOOL_NAME",
                    format!("`{tool_name}` is a reserved routing keyword, not a callable tool"),
                );
            }

            for (key, value) in parameters {
                if let serde_json::Value::String(s) = value {
                    check_var_refs(ctx, &format!("{path}.parameters.{key}"), s, scope);
                }
            }

            if let Some(name) = assigns_to {
                if !is_valid_identifier(name) {
                    ctx.error(
                        format!("{path}.assigns_to"),
                        "INVALID_IDENTIFIER",
                        format!("`{name}` is not a valid identifier"),
                    );
                    return Scope::new();
                }
                return Scope::from_names([name.clone()]);
            }
            Scope::new()
        }

        Node::Sequential { steps } => {
            let mut running = scope.clone();
            let mut delta = Scope::new();
            for (i, step) in steps.iter().enumerate() {
                let step_delta = validate_node(step, &format!("{path}.steps[{i}]"), &running, ctx);
                running.extend(&step_delta);
                delta.extend(&step_delta);
            }
            delta
        }

        Node::Conditional {
            condition,
            if_branch,
            else_branch,
        } => {
            check_condition(ctx, &format!("{path}.condition"), condition, scope);

            let if_delta = validate_node(if_branch, &format!("{path}.if_branch"), scope, ctx);
            match else_branch {
                Some(else_branch) => {
                    let else_delta =
                        validate_node(else_branch, &format!("{path}.else_branch"), scope, ctx);
                    Scope::intersection(&if_delta, &else_delta)
                }
                None => Scope::new(),
            }
        }

        Node::Parallel {
            branches,
            wait_for_all,
        } => {
            let mut deltas = Vec::with_capacity(branches.len());
            for (i, branch) in branches.iter().enumerate() {
                // Each branch sees only the pre-split scope: siblings cannot
                // observe each other's bindings mid-flight (invariant 4).
                deltas.push(validate_node(branch, &format!("{path}.branches[{i}]"), scope, ctx));
            }

            if !*wait_for_all {
                if deltas.iter().any(|d| d.names().next().is_some()) {
                    ctx.warn(
                        path.to_string(),
                        "FIRE_AND_FORGET_BINDING",
                        "branches of a wait_for_all=false parallel node assign variables that will not be visible to anything downstream",
                    );
                }
                return Scope::new();
            }

            let mut seen = BTreeSet::new();
            let mut conflicts = BTreeSet::new();
            for d in &deltas {
                for name in d.names() {
                    if !seen.insert(name.clone()) {
                        conflicts.insert(name.clone());
                    }
                }
            }
            for name in &conflicts {
                ctx.error(
                    path.to_string(),
                    "CONFLICTING_ASSIGNMENT",
                    format!("multiple parallel branches assign to `{name}`"),
                );
            }

            let mut merged = Scope::new();
            for d in &deltas {
                merged.extend(d);
            }
            merged
        }

        Node::Orchestrator {
            sub_workflows,
            routing_rules,
            default_workflow,
        } => {
            let known: BTreeSet<&str> = sub_workflows.keys().map(String::as_str).collect();

            if let Some(default) = default_workflow {
                if !known.contains(default.as_str()) {
                    ctx.error(
                        format!("{path}.default_workflow"),
                        "UNKNOWN_WORKFLOW",
                        format!("default_workflow `{default}` is not a key of sub_workflows"),
                    );
                }
            }

            for (i, rule) in routing_rules.iter().enumerate() {
                let rule_path = format!("{path}.routing_rules[{i}]");
                check_condition(ctx, &format!("{rule_path}.condition"), &rule.condition, scope);
                if !known.contains(rule.workflow_name.as_str()) {
                    ctx.error(
                        format!("{rule_path}.workflow_name"),
                        "UNKNOWN_WORKFLOW",
                        format!("`{}` is not a key of sub_workflows", rule.workflow_name),
                    );
                }
            }

            for (name, sub_node) in sub_workflows {
                // Sub-workflow bindings are private: the caller only sees
                // that the branch validated, never its assigned variables.
                validate_node(sub_node, &format!("{path}.sub_workflows.{name}"), scope, ctx);
            }

            Scope::new()
        }
    }
}
