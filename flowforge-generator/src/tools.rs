//! ABOUTME: Collects the unique tool methods an IR tree calls, in first-seen order (§4.5 part 2+5)
//! ABOUTME: Each method's signature is the superset of keyword argument names across all call sites

use std::collections::BTreeSet;

use flowforge_core::Node;

/// One tool method to emit: its name and the union of parameter names used
/// at every `tool_call` site that invokes it.
#[derive(Debug, Clone)]
pub struct ToolSignature {
    pub tool_name: String,
    pub param_names: BTreeSet<String>,
}

/// Walk the tree in DFS order and return one [`ToolSignature`] per unique
/// `tool_name`, in the order each name was first encountered.
#[must_use]
pub fn collect_tool_signatures(root: &Node) -> Vec<ToolSignature> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: std::collections::HashMap<String, BTreeSet<String>> = std::collections::HashMap::new();

    walk(root, &mut order, &mut by_name);

    order
        .into_iter()
        .map(|tool_name| {
            let param_names = by_name.remove(&tool_name).unwrap_or_default();
            ToolSignature {
                tool_name,
                param_names,
            }
        })
        .collect()
}

fn walk(
    node: &Node,
    order: &mut Vec<String>,
    by_name: &mut std::collections::HashMap<String, BTreeSet<String>>,
) {
    match node {
        Node::ToolCall {
            tool_name,
            parameters,
            ..
        } => {
            let entry = by_name.entry(tool_name.clone()).or_insert_with(|| {
                order.push(tool_name.clone());
                BTreeSet::new()
            });
            entry.extend(parameters.keys().cloned());
        }
        Node::Sequential { steps } => {
            for step in steps {
                walk(step, order, by_name);
            }
        }
        Node::Conditional {
            if_branch,
            else_branch,
            ..
        } => {
            walk(if_branch, order, by_name);
            if let Some(else_branch) = else_branch {
                walk(else_branch, order, by_name);
            }
        }
        Node::Parallel { branches, .. } => {
            for branch in branches {
                walk(branch, order, by_name);
            }
        }
        Node::Orchestrator { sub_workflows, .. } => {
            for sub_node in sub_workflows.values() {
                walk(sub_node, order, by_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn collects_first_seen_order_and_superset_params() {
        let tree = Node::Sequential {
            steps: vec![
                Node::ToolCall {
                    tool_name: "fetch".into(),
                    parameters: BTreeMap::from([("id".to_string(), serde_json::json!(1))]),
                    assigns_to: None,
                },
                Node::ToolCall {
                    tool_name: "notify".into(),
                    parameters: BTreeMap::new(),
                    assigns_to: None,
                },
                Node::ToolCall {
                    tool_name: "fetch".into(),
                    parameters: BTreeMap::from([("region".to_string(), serde_json::json!("x"))]),
                    assigns_to: None,
                },
            ],
        };
        let sigs = collect_tool_signatures(&tree);
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].tool_name, "fetch");
        assert_eq!(sigs[1].tool_name, "notify");
        assert!(sigs[0].param_names.contains("id"));
        assert!(sigs[0].param_names.contains("region"));
    }
}
