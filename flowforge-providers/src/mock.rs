//! ABOUTME: Scripted provider for pipeline tests — no network access required
//! ABOUTME: Lives in the public API (not behind cfg(test)) so downstream crates can script it too

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flowforge_core::FlowForgeError;

use crate::abstraction::{CompletionRequest, ProviderInstance};

/// Returns one scripted response per call, in order; errors if exhausted.
pub struct MockProvider {
    name: String,
    responses: Vec<Result<String, String>>,
    calls: AtomicUsize,
}

impl MockProvider {
    #[must_use]
    pub fn new(name: impl Into<String>, responses: Vec<Result<String, String>>) -> Self {
        Self {
            name: name.into(),
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderInstance for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, FlowForgeError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(idx) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(FlowForgeError::Provider {
                provider: self.name.clone(),
                message: message.clone(),
                source: None,
            }),
            None => Err(FlowForgeError::Provider {
                provider: self.name.clone(),
                message: "mock provider exhausted its scripted responses".to_string(),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_scripted_responses_in_order() {
        let provider = MockProvider::new(
            "mock",
            vec![Ok("first".to_string()), Err("boom".to_string())],
        );
        let req = CompletionRequest {
            system_prompt: String::new(),
            user_prompt: String::new(),
            model: "mock-model".to_string(),
            temperature: 0.0,
            max_tokens: 10,
        };

        assert_eq!(provider.complete(&req).await.unwrap(), "first");
        assert!(provider.complete(&req).await.is_err());
        assert!(provider.complete(&req).await.is_err());
        assert_eq!(provider.call_count(), 3);
    }
}
