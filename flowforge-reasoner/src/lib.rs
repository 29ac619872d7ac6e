//! ABOUTME: The Reasoner — prompts an LLM for a candidate IR and scores its confidence (§4.2)
//! ABOUTME: Network-level retries here are independent of the Orchestrator's pipeline retry counter

pub mod confidence;
pub mod json_extract;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use flowforge_core::FlowForgeError;
use flowforge_parser::ParsedSections;
use flowforge_providers::{CompletionRequest, ProviderInstance};

/// A candidate IR plus its provenance, handed to the Validator.
#[derive(Debug, Clone)]
pub struct ReasonerOutput {
    /// Unvalidated candidate IR, still raw JSON (the Validator deserializes and checks it).
    pub candidate: serde_json::Value,
    pub confidence: f32,
    pub reasoning_trace: String,
}

pub struct Reasoner {
    provider: Arc<dyn ProviderInstance>,
}

impl Reasoner {
    #[must_use]
    pub fn new(provider: Arc<dyn ProviderInstance>) -> Self {
        Self { provider }
    }

    /// Run one reasoning attempt: build the prompt, call the provider (with
    /// network-level retry), parse the JSON response, and score confidence.
    ///
    /// `retry_count` is the Orchestrator's pipeline retry counter (used for
    /// the confidence penalty), not this method's own network-retry budget.
    pub async fn reason(
        &self,
        sections: &ParsedSections,
        feedback: &[String],
        retry_count: u32,
        diagnostic_count: usize,
        model_version: Option<&str>,
        prompt_version: &str,
    ) -> Result<ReasonerOutput, FlowForgeError> {
        let system_prompt = prompt::build_system_prompt(prompt_version);
        let user_prompt = prompt::build_user_prompt(sections, feedback);

        let request = CompletionRequest {
            system_prompt,
            user_prompt,
            model: model_version
                .map(str::to_string)
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            temperature: 0.2,
            max_tokens: 4096,
        };

        let raw = self.complete_with_network_retry(&request, 2).await?;

        if raw.trim().is_empty() {
            return Err(FlowForgeError::Provider {
                provider: self.provider.name().to_string(),
                message: "empty response from provider".to_string(),
                source: None,
            });
        }

        let stripped = json_extract::strip_code_fence(&raw);
        let candidate: serde_json::Value = match serde_json::from_str(stripped) {
            Ok(value) => value,
            Err(e) => {
                // Malformed JSON: confidence 0, counted as a (retryable) ParsingError.
                tracing::warn!(error = %e, "reasoner received malformed JSON");
                return Err(FlowForgeError::Parsing {
                    message: format!("model response was not valid JSON: {e}"),
                });
            }
        };

        let confidence = confidence::score(retry_count, diagnostic_count);

        Ok(ReasonerOutput {
            candidate,
            confidence,
            reasoning_trace: format!(
                "provider={} model={} retry={} diagnostics={}",
                self.provider.name(),
                request.model,
                retry_count,
                diagnostic_count
            ),
        })
    }

    /// Call the provider, retrying transport-level failures up to
    /// `max_network_retries` times with exponential backoff (100ms base).
    async fn complete_with_network_retry(
        &self,
        request: &CompletionRequest,
        max_network_retries: u32,
    ) -> Result<String, FlowForgeError> {
        let mut attempt = 0;
        loop {
            match self.provider.complete(request).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < max_network_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                    tracing::warn!(attempt, ?delay, %err, "provider call failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_providers::mock::MockProvider;

    fn sections() -> ParsedSections {
        ParsedSections {
            name: Some("wf".into()),
            description: Some("desc".into()),
            inputs_text: Some("- x (string): d".into()),
            steps_text: Some("1. do it".into()),
            outputs_text: Some("- y (string): d".into()),
        }
    }

    #[tokio::test]
    async fn parses_well_formed_json_response() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![Ok(r#"{"name": "wf"}"#.to_string())],
        ));
        let reasoner = Reasoner::new(provider);
        let out = reasoner
            .reason(&sections(), &[], 0, 0, None, "v1")
            .await
            .unwrap();
        assert_eq!(out.candidate["name"], "wf");
        assert!((out.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn strips_fences_before_parsing() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![Ok("```json\n{\"name\": \"wf\"}\n```".to_string())],
        ));
        let reasoner = Reasoner::new(provider);
        let out = reasoner
            .reason(&sections(), &[], 0, 0, None, "v1")
            .await
            .unwrap();
        assert_eq!(out.candidate["name"], "wf");
    }

    #[tokio::test]
    async fn malformed_json_is_a_parsing_error() {
        let provider = Arc::new(MockProvider::new("mock", vec![Ok("not json".to_string())]));
        let reasoner = Reasoner::new(provider);
        let err = reasoner
            .reason(&sections(), &[], 0, 0, None, "v1")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "ParsingError");
    }

    #[tokio::test]
    async fn retries_transient_provider_failures_then_succeeds() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![
                Err("timeout".to_string()),
                Err("timeout".to_string()),
                Ok(r#"{"name": "wf"}"#.to_string()),
            ],
        ));
        let reasoner = Reasoner::new(provider.clone());
        let out = reasoner
            .reason(&sections(), &[], 0, 0, None, "v1")
            .await
            .unwrap();
        assert_eq!(out.candidate["name"], "wf");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_network_retry_budget_exhausted() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![
                Err("timeout".to_string()),
                Err("timeout".to_string()),
                Err("timeout".to_string()),
            ],
        ));
        let reasoner = Reasoner::new(provider.clone());
        let err = reasoner
            .reason(&sections(), &[], 0, 0, None, "v1")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "ProviderError");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn higher_retry_count_and_diagnostics_lower_confidence() {
        let provider = Arc::new(MockProvider::new(
            "mock",
            vec![Ok(r#"{"name": "wf"}"#.to_string())],
        ));
        let reasoner = Reasoner::new(provider);
        let out = reasoner
            .reason(&sections(), &["prior error".into()], 2, 2, None, "v1")
            .await
            .unwrap();
        // 1.0 - 0.2 (retries) - 0.2 (diagnostics) = 0.6
        assert!((out.confidence - 0.6).abs() < 1e-6);
    }
}
