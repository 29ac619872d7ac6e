//! ABOUTME: The WorkflowSpec IR — envelope, Parameter, and the Node tagged union (§3)
//! ABOUTME: Pure data; no validation logic lives here (see flowforge-validator)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ident::looks_like_credential;

/// Parameter type tokens from §3.2, modeled as a closed enum so the Generator
/// gets an exhaustive match while still serializing to the lowercase wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Date,
    Text,
    Email,
    Object,
}

impl ParameterType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Text => "text",
            Self::Email => "email",
            Self::Object => "object",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "text" => Self::Text,
            "email" => Self::Email,
            "object" => Self::Object,
            _ => return None,
        })
    }
}

/// §3.2 `Parameter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParameterType,
    pub description: String,
    pub is_credential: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Parameter {
    /// Build a parameter, auto-setting `is_credential` per §3.2's substring rule.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParameterType, description: impl Into<String>) -> Self {
        let name = name.into();
        let is_credential = looks_like_credential(&name);
        Self {
            name,
            ty,
            description: description.into(),
            is_credential,
            required: true,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(mut self, default: Option<serde_json::Value>) -> Self {
        self.required = false;
        self.default = default;
        self
    }
}

/// A single routing rule inside an `orchestrator` node (§3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub condition: String,
    pub workflow_name: String,
}

/// §3.3 `Node` tagged union, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    ToolCall {
        tool_name: String,
        parameters: BTreeMap<String, serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        assigns_to: Option<String>,
    },
    Sequential {
        steps: Vec<Node>,
    },
    Conditional {
        condition: String,
        if_branch: Box<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<Node>>,
    },
    Parallel {
        branches: Vec<Node>,
        #[serde(default = "default_wait_for_all")]
        wait_for_all: bool,
    },
    Orchestrator {
        sub_workflows: BTreeMap<String, Node>,
        routing_rules: Vec<RoutingRule>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_workflow: Option<String>,
    },
}

fn default_wait_for_all() -> bool {
    true
}

impl Node {
    /// Short discriminant name, used in diagnostics and generated comments.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::Sequential { .. } => "sequential",
            Self::Conditional { .. } => "conditional",
            Self::Parallel { .. } => "parallel",
            Self::Orchestrator { .. } => "orchestrator",
        }
    }
}

/// §3.1 envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub name: String,
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub workflow: Node,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_type_round_trips_through_string() {
        for s in [
            "string", "number", "integer", "float", "boolean", "date", "text", "email", "object",
        ] {
            let ty = ParameterType::parse(s).unwrap();
            assert_eq!(ty.as_str(), s);
        }
    }

    #[test]
    fn parameter_auto_detects_credential() {
        let p = Parameter::new("database_url", ParameterType::String, "Postgres DSN");
        assert!(p.is_credential);

        let p = Parameter::new("customer_id", ParameterType::String, "the customer");
        assert!(!p.is_credential);
    }

    #[test]
    fn node_kind_tags_match_wire_discriminant() {
        let n = Node::ToolCall {
            tool_name: "fetch".into(),
            parameters: BTreeMap::new(),
            assigns_to: None,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "tool_call");
        assert_eq!(n.kind(), "tool_call");
    }
}
