//! ABOUTME: The Orchestrator — drives Parser -> Reasoner -> Validator -> Serializer -> Generator (§4.6)
//! ABOUTME: Owns retry accounting, escalation, checkpointing, timeouts, and cancellation (§5, §7)

pub mod checkpoint;
pub mod state;
pub mod state_machine;

use std::sync::Arc;

use chrono::Utc;
use flowforge_config::FlowForgeConfig;
use flowforge_core::WorkflowSpec;
use flowforge_providers::ProviderInstance;
use flowforge_reasoner::Reasoner;
use tokio_util::sync::CancellationToken;

use checkpoint::{CheckpointSink, InMemoryCheckpointSink};
use state::State;
use state_machine::{transition, Event, ExecutionStatus};

/// §6 `Result`: the shape returned to CLI/HTTP/chatbot collaborators.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub status: ExecutionStatus,
    pub workflow_name: Option<String>,
    pub generated_code: Option<String>,
    pub serialized_ir: Option<String>,
    pub metadata: serde_json::Value,
    pub errors: Vec<String>,
    pub confidence: f32,
    /// §7 error-envelope tag. `None` for `Complete`; always `Some` for
    /// `Failed`/`Escalated` so collaborators never see a guessed classification.
    pub error_type: Option<&'static str>,
}

impl PipelineResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Complete)
    }
}

pub struct PipelineController {
    provider: Arc<dyn ProviderInstance>,
    config: FlowForgeConfig,
    checkpoint_sink: Arc<dyn CheckpointSink>,
}

impl PipelineController {
    #[must_use]
    pub fn new(provider: Arc<dyn ProviderInstance>, config: FlowForgeConfig) -> Self {
        Self {
            provider,
            config,
            checkpoint_sink: Arc::new(InMemoryCheckpointSink::new()),
        }
    }

    #[must_use]
    pub fn with_checkpoint_sink(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.checkpoint_sink = sink;
        self
    }

    /// Run one full pipeline over `raw_spec`. Respects the total wall-clock
    /// budget in `self.config` (§5) and `cancellation` (best-effort abort
    /// between nodes, or mid-flight for the LLM call itself via
    /// `tokio::time::timeout`'s cooperation with the awaited future).
    pub async fn compile(
        &self,
        raw_spec: &str,
        model_version: Option<&str>,
        prompt_version: Option<&str>,
        cancellation: CancellationToken,
    ) -> PipelineResult {
        let execution_id = uuid::Uuid::new_v4().to_string();
        let budget = self.config.pipeline_timeout();

        match tokio::time::timeout(
            budget,
            self.run_inner(raw_spec, model_version, prompt_version, execution_id.clone(), cancellation),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(execution_id, "pipeline exceeded total wall-clock budget");
                PipelineResult {
                    status: ExecutionStatus::Failed,
                    workflow_name: None,
                    generated_code: None,
                    serialized_ir: None,
                    metadata: serde_json::json!({"execution_id": execution_id}),
                    errors: vec![format!("pipeline exceeded {budget:?} total wall-clock budget")],
                    confidence: 0.0,
                    // The dominant wall-clock cost on every loop iteration is the
                    // LLM call itself (§7 groups timeouts under ProviderError).
                    error_type: Some("ProviderError"),
                }
            }
        }
    }

    async fn run_inner(
        &self,
        raw_spec: &str,
        model_version: Option<&str>,
        prompt_version: Option<&str>,
        execution_id: String,
        cancellation: CancellationToken,
    ) -> PipelineResult {
        let prompt_version = prompt_version.unwrap_or(&self.config.prompt_version);
        let reasoner = Reasoner::new(self.provider.clone());

        let mut state = State::new(execution_id.clone(), raw_spec.to_string());
        state.timestamp = Utc::now().to_rfc3339();
        state.execution_status = transition(state.execution_status, &Event::StartParsing);
        self.checkpoint(&state);

        let parse_result = flowforge_parser::parse(raw_spec);
        state.parsed_sections = Some(parse_result.sections.clone());
        state.execution_status = transition(state.execution_status, &Event::ParsingDone);
        self.checkpoint(&state);

        loop {
            if cancellation.is_cancelled() {
                state.execution_status = transition(state.execution_status, &Event::Cancelled);
                self.checkpoint(&state);
                return self.cancelled_result(&state);
            }

            state.execution_status = transition(state.execution_status, &Event::StartReasoning);
            self.checkpoint(&state);

            let reasoning = tokio::time::timeout(
                self.config.llm_call_timeout(),
                reasoner.reason(
                    &parse_result.sections,
                    &state.feedback_messages,
                    state.retry_count,
                    parse_result.diagnostics.len(),
                    model_version,
                    prompt_version,
                ),
            )
            .await;

            let reasoning = match reasoning {
                Ok(inner) => inner,
                Err(_) => {
                    state.record_error("reasoner call exceeded per-attempt timeout");
                    state.execution_status = transition(state.execution_status, &Event::TimedOut);
                    self.checkpoint(&state);
                    return self.failed_result(&state, "ProviderError");
                }
            };

            let reasoning = match reasoning {
                Ok(output) => output,
                Err(err) if err.is_retryable() => {
                    state.record_error(err.to_string());
                    state.retry_count += 1;
                    if state.retry_count >= self.config.max_retries {
                        state.execution_status =
                            transition(state.execution_status, &Event::RetryBudgetExhausted);
                        self.checkpoint(&state);
                        return self.escalated_result(&state);
                    }
                    // Stays in Reasoning; the next loop iteration re-invokes it with feedback.
                    state.execution_status =
                        transition(state.execution_status, &Event::ReasoningFailed { retryable: true });
                    self.checkpoint(&state);
                    continue;
                }
                Err(err) => {
                    let error_type = err.error_type();
                    state.record_error(err.to_string());
                    state.execution_status =
                        transition(state.execution_status, &Event::ReasoningFailed { retryable: false });
                    self.checkpoint(&state);
                    return self.failed_result(&state, error_type);
                }
            };

            state.candidate_ir = Some(reasoning.candidate.clone());
            state.confidence_score = reasoning.confidence;
            state.execution_status = transition(state.execution_status, &Event::ReasoningSucceeded);
            self.checkpoint(&state);

            state.execution_status = transition(state.execution_status, &Event::StartValidating);
            match flowforge_validator::validate(&reasoning.candidate) {
                Ok((spec, warnings)) => {
                    for w in &warnings {
                        tracing::warn!(code = %w.code, path = %w.path, "{}", w.message);
                    }
                    if reasoning.confidence < self.config.confidence_threshold {
                        state.execution_status = transition(state.execution_status, &Event::LowConfidence);
                        state.validated_spec = Some(spec);
                        self.checkpoint(&state);
                        return self.escalated_result(&state);
                    }
                    state.validated_spec = Some(spec);
                    state.execution_status = transition(state.execution_status, &Event::ValidationSucceeded);
                    self.checkpoint(&state);
                    return self.generate_and_finish(state);
                }
                Err(errors) => {
                    state.record_validation_failure(&errors);
                    state.retry_count += 1;
                    if state.retry_count >= self.config.max_retries {
                        state.execution_status =
                            transition(state.execution_status, &Event::RetryBudgetExhausted);
                        self.checkpoint(&state);
                        return self.escalated_result(&state);
                    }
                    state.execution_status =
                        transition(state.execution_status, &Event::ValidationFailed { retryable: true });
                    self.checkpoint(&state);
                    // Loop back to Reasoning with feedback listing every error (P9).
                }
            }
        }
    }

    fn generate_and_finish(&self, mut state: State) -> PipelineResult {
        let spec: WorkflowSpec = state
            .validated_spec
            .clone()
            .expect("validated_spec is set before generate_and_finish is called");

        let serialized = match flowforge_serializer::serialize_canonical(&spec) {
            Ok(json) => json,
            Err(err) => {
                let error_type = err.error_type();
                state.record_error(err.to_string());
                state.execution_status = transition(state.execution_status, &Event::GenerationFailed);
                self.checkpoint(&state);
                return self.failed_result(&state, error_type);
            }
        };
        state.serialized_json = Some(serialized.clone());

        state.execution_status = transition(state.execution_status, &Event::StartGenerating);
        let artifact = flowforge_generator::generate(&spec, state.confidence_score, Utc::now());
        state.generated_code = Some(artifact.code.clone());
        state.execution_status = transition(state.execution_status, &Event::GenerationSucceeded);
        self.checkpoint(&state);

        PipelineResult {
            status: state.execution_status,
            workflow_name: Some(spec.name.clone()),
            generated_code: Some(artifact.code),
            serialized_ir: Some(serialized),
            metadata: serde_json::json!({
                "execution_id": state.execution_id,
                "code_size_bytes": artifact.code_size_bytes,
                "generated_at": artifact.generated_at.to_rfc3339(),
                "retry_count": state.retry_count,
            }),
            errors: Vec::new(),
            confidence: state.confidence_score,
            error_type: None,
        }
    }

    fn escalated_result(&self, state: &State) -> PipelineResult {
        PipelineResult {
            status: ExecutionStatus::Escalated,
            workflow_name: state.validated_spec.as_ref().map(|s| s.name.clone()),
            generated_code: None,
            serialized_ir: None,
            metadata: serde_json::json!({
                "execution_id": state.execution_id,
                "retry_count": state.retry_count,
                "partial_ir": state.candidate_ir,
            }),
            errors: state.error_history.clone(),
            confidence: state.confidence_score,
            error_type: Some("EscalationRequired"),
        }
    }

    fn failed_result(&self, state: &State, error_type: &'static str) -> PipelineResult {
        PipelineResult {
            status: ExecutionStatus::Failed,
            workflow_name: None,
            generated_code: None,
            serialized_ir: None,
            metadata: serde_json::json!({"execution_id": state.execution_id}),
            errors: state.error_history.clone(),
            confidence: state.confidence_score,
            error_type: Some(error_type),
        }
    }

    fn cancelled_result(&self, state: &State) -> PipelineResult {
        PipelineResult {
            status: ExecutionStatus::Failed,
            workflow_name: None,
            generated_code: None,
            serialized_ir: None,
            metadata: serde_json::json!({"execution_id": state.execution_id, "cancelled": true}),
            errors: vec!["run cancelled before completion".to_string()],
            confidence: state.confidence_score,
            // An in-flight LLM call is what cancellation actually aborts (§5).
            error_type: Some("ProviderError"),
        }
    }

    fn checkpoint(&self, state: &State) {
        self.checkpoint_sink.save(&state.execution_id, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_providers::mock::MockProvider;

    const VALID_SPEC_JSON: &str = r#"{
        "name": "data_processing_pipeline",
        "description": "process a customer",
        "version": "1.0.0",
        "inputs": [{"name": "customer_id", "type": "string", "description": "id", "is_credential": false, "required": true}],
        "outputs": [{"name": "result", "type": "string", "description": "out", "is_credential": false, "required": true}],
        "workflow": {
            "type": "tool_call",
            "tool_name": "fetch_customer_data",
            "parameters": {"id": "{{customer_id}}"},
            "assigns_to": "result"
        },
        "metadata": {}
    }"#;

    const RAW_SPEC: &str = "Workflow: data_processing_pipeline\n\
Description: process a customer\n\n\
Inputs:\n\
- customer_id (string): the customer\n\n\
Steps:\n\
1. Fetch customer data\n\n\
Outputs:\n\
- result (string): the output\n";

    fn controller(provider: Arc<MockProvider>) -> PipelineController {
        PipelineController::new(provider, FlowForgeConfig::default())
    }

    #[tokio::test]
    async fn successful_run_reaches_complete() {
        let provider = Arc::new(MockProvider::new("mock", vec![Ok(VALID_SPEC_JSON.to_string())]));
        let result = controller(provider)
            .compile(RAW_SPEC, None, None, CancellationToken::new())
            .await;
        assert_eq!(result.status, ExecutionStatus::Complete);
        assert!(result.generated_code.is_some());
        assert!(result.serialized_ir.is_some());
        assert_eq!(result.workflow_name.as_deref(), Some("data_processing_pipeline"));
        assert_eq!(result.error_type, None);
    }

    #[tokio::test]
    async fn malformed_json_exhausts_retries_and_escalates() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![Ok("not json".into()), Ok("not json".into()), Ok("not json".into())],
        ));
        let result = controller(provider)
            .compile(RAW_SPEC, None, None, CancellationToken::new())
            .await;
        assert_eq!(result.status, ExecutionStatus::Escalated);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.error_type, Some("EscalationRequired"));
    }

    #[tokio::test]
    async fn validation_failure_then_success_on_retry() {
        let invalid = r#"{"name": "BadName!", "description": "d", "version": "1.0.0", "inputs": [], "outputs": [], "workflow": {"type": "tool_call", "tool_name": "a", "parameters": {}}, "metadata": {}}"#;
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![Ok(invalid.to_string()), Ok(VALID_SPEC_JSON.to_string())],
        ));
        let result = controller(provider)
            .compile(RAW_SPEC, None, None, CancellationToken::new())
            .await;
        assert_eq!(result.status, ExecutionStatus::Complete);
    }

    #[tokio::test]
    async fn low_confidence_after_success_escalates() {
        // Missing `Outputs:` yields one soft parse diagnostic, dropping
        // confidence to 0.9 (1.0 - 0.1 per diagnostic) even though the
        // candidate IR itself validates cleanly.
        let incomplete_raw = "Workflow: data_processing_pipeline\n\
Description: process a customer\n\n\
Inputs:\n\
- customer_id (string): the customer\n\n\
Steps:\n\
1. Fetch customer data\n";

        let mut config = FlowForgeConfig::default();
        config.confidence_threshold = 0.95;
        let provider = Arc::new(MockProvider::new("mock", vec![Ok(VALID_SPEC_JSON.to_string())]));
        let result = PipelineController::new(provider, config)
            .compile(incomplete_raw, None, None, CancellationToken::new())
            .await;
        assert_eq!(result.status, ExecutionStatus::Escalated);
        assert!(result.generated_code.is_none());
    }

    #[tokio::test]
    async fn cancellation_before_start_yields_failed_with_no_artifacts() {
        let provider = Arc::new(MockProvider::new("mock", vec![Ok(VALID_SPEC_JSON.to_string())]));
        let token = CancellationToken::new();
        token.cancel();
        let result = controller(provider).compile(RAW_SPEC, None, None, token).await;
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.generated_code.is_none());
        assert!(result.serialized_ir.is_none());
        assert_eq!(result.error_type, Some("ProviderError"));
    }

    #[tokio::test]
    async fn provider_error_surfaces_without_pipeline_level_retry() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![
                Err("boom".into()),
                Err("boom".into()),
                Err("boom".into()),
                Err("boom".into()),
            ],
        ));
        let result = controller(provider)
            .compile(RAW_SPEC, None, None, CancellationToken::new())
            .await;
        // 3 network retries inside the Reasoner exhaust after 3 calls (1 + 2 retries);
        // the resulting ProviderError is not retryable at the pipeline level.
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.error_type, Some("ProviderError"));
    }
}
