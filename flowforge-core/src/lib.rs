//! ABOUTME: Core IR types, error taxonomy, and shared vocabulary for the FlowForge compiler
//! ABOUTME: Depended on by every other FlowForge crate; holds no pipeline logic of its own

pub mod error;
pub mod expr;
pub mod ident;
pub mod ir;

pub use error::{FlowForgeError, Result, ValidationError, ValidationWarning};
pub use ir::{Node, Parameter, ParameterType, RoutingRule, WorkflowSpec};
