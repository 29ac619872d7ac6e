//! ABOUTME: Per-run pipeline state (§4.6, §3.6): mutable within a run, discarded on termination
//! ABOUTME: Serializable so it can round-trip through a `CheckpointSink`

use flowforge_core::{ValidationError, WorkflowSpec};
use serde::{Deserialize, Serialize};

use crate::state_machine::ExecutionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub execution_id: String,
    pub raw_spec: String,
    pub parsed_sections: Option<flowforge_parser::ParsedSections>,
    /// Latest candidate IR from the Reasoner, pre-validation.
    pub candidate_ir: Option<serde_json::Value>,
    pub validated_spec: Option<WorkflowSpec>,
    pub serialized_json: Option<String>,
    pub generated_code: Option<String>,
    pub retry_count: u32,
    pub error_history: Vec<String>,
    pub feedback_messages: Vec<String>,
    pub confidence_score: f32,
    pub execution_status: ExecutionStatus,
    pub timestamp: String,
}

impl State {
    #[must_use]
    pub fn new(execution_id: String, raw_spec: String) -> Self {
        Self {
            execution_id,
            raw_spec,
            parsed_sections: None,
            candidate_ir: None,
            validated_spec: None,
            serialized_json: None,
            generated_code: None,
            retry_count: 0,
            error_history: Vec::new(),
            feedback_messages: Vec::new(),
            confidence_score: 0.0,
            execution_status: ExecutionStatus::Initial,
            timestamp: String::new(),
        }
    }

    /// Push every validation error's display string into both the error
    /// history (permanent record) and feedback (consumed by the next
    /// Reasoner attempt), per P9.
    pub fn record_validation_failure(&mut self, errors: &[ValidationError]) {
        for e in errors {
            let message = e.to_string();
            self.error_history.push(message.clone());
            self.feedback_messages.push(message);
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error_history.push(message.clone());
        self.feedback_messages.push(message);
    }
}
