//! ABOUTME: AI/ML API provider backend (OpenAI-compatible chat completions)
//! ABOUTME: Talks to `AIMLAPI_KEY`-authenticated /v1/chat/completions

use async_trait::async_trait;
use flowforge_core::FlowForgeError;
use serde_json::json;

use crate::abstraction::{CompletionRequest, ProviderInstance, ProviderKind};
use crate::config::ProviderHttpConfig;

pub struct AimlapiProvider {
    client: reqwest::Client,
    config: ProviderHttpConfig,
}

impl AimlapiProvider {
    #[must_use]
    pub fn new(config: ProviderHttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ProviderInstance for AimlapiProvider {
    fn name(&self) -> &str {
        ProviderKind::Aimlapi.as_str()
    }

    fn default_model(&self) -> &str {
        ProviderKind::Aimlapi.default_model()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, FlowForgeError> {
        let body = json!({
            "model": request.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
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

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: "response missing choices[0].message.content".to_string(),
                source: None,
            })
    }
}
