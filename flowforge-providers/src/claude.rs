//! ABOUTME: Anthropic Messages API provider backend
//! ABOUTME: Talks to `ANTHROPIC_API_KEY`-authenticated /v1/messages

use async_trait::async_trait;
use flowforge_core::FlowForgeError;
use serde_json::json;

use crate::abstraction::{CompletionRequest, ProviderInstance, ProviderKind};
use crate::config::ProviderHttpConfig;

pub struct ClaudeProvider {
    client: reqwest::Client,
    config: ProviderHttpConfig,
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(config: ProviderHttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ProviderInstance for ClaudeProvider {
    fn name(&self) -> &str {
        ProviderKind::Claude.as_str()
    }

    fn default_model(&self) -> &str {
        ProviderKind::Claude.default_model()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, FlowForgeError> {
        let body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system_prompt,
            "messages": [{"role": "user", "content": request.user_prompt}],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: format!("request failed: {e}"),
                source: Some(anyhow::Error::from(e)),
            })?;

        if !response.status().is_success() {
            return Err(FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: format!("non-success status: {}", response.status()),
                source: None,
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|e| FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: format!("malformed response body: {e}"),
                source: Some(anyhow::Error::from(e)),
            })?;

        payload["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: "response missing content[0].text".to_string(),
                source: None,
            })
    }
}
