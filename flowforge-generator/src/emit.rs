//! ABOUTME: Compiles a validated `Node` tree into the body of the generated agent's `run` method
//! ABOUTME: Preserves IR order within every node per §4.5 part 5's lexical-ordering guarantee

use flowforge_core::Node;

use crate::writer::CodeWriter;

fn escape_raw(s: &str) -> String {
    // The emitted source embeds condition/template strings as Rust raw string
    // literals; `"#` can't appear inside one, so fall back to escaping quotes.
    if s.contains("\"#") {
        s.replace('\\', "\\\\").replace('"', "\\\"")
    } else {
        s.to_string()
    }
}

fn raw_str_literal(s: &str) -> String {
    if s.contains("\"#") {
        format!("\"{}\"", escape_raw(s))
    } else {
        format!("r#\"{s}\"#")
    }
}

fn emit_parameter_value(value: &serde_json::Value, out: &mut CodeWriter, var: &str) {
    match value {
        serde_json::Value::String(s) => {
            out.line(&format!(
                "kwargs.insert({var:?}.to_string(), serde_json::Value::String(substitute_vars({}, &scope)));",
                raw_str_literal(s)
            ));
        }
        other => {
            let literal = serde_json::to_string(other).unwrap_or_else(|_| "null".to_string());
            out.line(&format!(
                "kwargs.insert({var:?}.to_string(), serde_json::from_str({}).expect(\"generator-emitted literal is valid JSON\"));",
                raw_str_literal(&literal)
            ));
        }
    }
}

/// Compile `node` into statements that mutate a local `scope: Scope` binding,
/// writing into `out`. `sub_workflows` routing arms return `Err(RoutingError)`
/// on no match, so the caller's enclosing method must itself return `Result`.
pub fn emit_node(node: &Node, out: &mut CodeWriter) {
    match node {
        Node::ToolCall {
            tool_name,
            parameters,
            assigns_to,
        } => {
            out.line("{");
            out.indent();
            out.line("let mut kwargs: std::collections::HashMap<String, serde_json::Value> = std::collections::HashMap::new();");
            for (key, value) in parameters {
                emit_parameter_value(value, out, key);
            }
            out.line(&format!("let result = self.{tool_name}(kwargs);"));
            if let Some(name) = assigns_to {
                out.line(&format!("scope.insert({name:?}.to_string(), result);"));
            }
            out.dedent();
            out.line("}");
        }

        Node::Sequential { steps } => {
            out.line("{");
            out.indent();
            for step in steps {
                emit_node(step, out);
            }
            out.dedent();
            out.line("}");
        }

        Node::Conditional {
            condition,
            if_branch,
            else_branch,
        } => {
            out.line(&format!(
                "if eval_condition({}, &scope) {{",
                raw_str_literal(condition)
            ));
            out.indent();
            emit_node(if_branch, out);
            out.dedent();
            if let Some(else_branch) = else_branch {
                out.line("} else {");
                out.indent();
                emit_node(else_branch, out);
                out.dedent();
            }
            out.line("}");
        }

        Node::Parallel {
            branches,
            wait_for_all,
        } => {
            out.line("{");
            out.indent();
            if *wait_for_all {
                out.line("let mut branch_scopes: Vec<Scope> = Vec::new();");
                for branch in branches {
                    out.line("{");
                    out.indent();
                    out.line("let mut scope = scope.clone();");
                    emit_node(branch, out);
                    out.line("branch_scopes.push(scope);");
                    out.dedent();
                    out.line("}");
                }
                out.line("for branch_scope in branch_scopes {");
                out.indent();
                out.line("for (k, v) in branch_scope {");
                out.indent();
                out.line("scope.entry(k).or_insert(v);");
                out.dedent();
                out.line("}");
                out.dedent();
                out.line("}");
            } else {
                // Fire-and-forget: run against isolated copies, discard bindings.
                for branch in branches {
                    out.line("{");
                    out.indent();
                    out.line("let mut scope = scope.clone();");
                    emit_node(branch, out);
                    out.dedent();
                    out.line("}");
                }
            }
            out.dedent();
            out.line("}");
        }

        Node::Orchestrator {
            sub_workflows,
            routing_rules,
            default_workflow,
        } => {
            out.line("{");
            out.indent();
            out.line("let mut selected: Option<&str> = None;");
            for rule in routing_rules {
                out.line(&format!(
                    "if selected.is_none() && eval_condition({}, &scope) {{ selected = Some({:?}); }}",
                    raw_str_literal(&rule.condition),
                    rule.workflow_name
                ));
            }
            match default_workflow {
                Some(default) => out.line(&format!("let selected = selected.or(Some({default:?}));")),
                None => out.line("let selected = selected;"),
            }
            out.line("match selected {");
            out.indent();
            for (name, sub_node) in sub_workflows {
                out.line(&format!("Some({name:?}) => {{"));
                out.indent();
                emit_node(sub_node, out);
                out.dedent();
                out.line("}");
            }
            out.line("_ => return Err(RoutingError::NoMatchingRoute),");
            out.dedent();
            out.line("}");
            out.dedent();
            out.line("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn emits_tool_call_with_assignment() {
        let node = Node::ToolCall {
            tool_name: "fetch".into(),
            parameters: BTreeMap::from([("id".to_string(), serde_json::json!("{{customer_id}}"))]),
            assigns_to: Some("customer".into()),
        };
        let mut w = CodeWriter::new();
        emit_node(&node, &mut w);
        let code = w.finish();
        assert!(code.contains("self.fetch(kwargs)"));
        assert!(code.contains("scope.insert(\"customer\".to_string(), result);"));
    }

    #[test]
    fn emits_conditional_with_both_branches() {
        let node = Node::Conditional {
            condition: "{{amount}} > 500".into(),
            if_branch: Box::new(Node::ToolCall {
                tool_name: "escalate".into(),
                parameters: BTreeMap::new(),
                assigns_to: None,
            }),
            else_branch: Some(Box::new(Node::ToolCall {
                tool_name: "approve".into(),
                parameters: BTreeMap::new(),
                assigns_to: None,
            })),
        };
        let mut w = CodeWriter::new();
        emit_node(&node, &mut w);
        let code = w.finish();
        assert!(code.contains("eval_condition("));
        assert!(code.contains("self.escalate(kwargs)"));
        assert!(code.contains("self.approve(kwargs)"));
    }
}
