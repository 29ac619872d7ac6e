//! ABOUTME: Google Gemini provider backend (generateContent REST API)
//! ABOUTME: Talks to `GEMINI_API_KEY`-authenticated /v1beta/models/{model}:generateContent

use async_trait::async_trait;
use flowforge_core::FlowForgeError;
use serde_json::json;

use crate::abstraction::{CompletionRequest, ProviderInstance, ProviderKind};
use crate::config::ProviderHttpConfig;

pub struct GeminiProvider {
    client: reqwest::Client,
    config: ProviderHttpConfig,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(config: ProviderHttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ProviderInstance for GeminiProvider {
    fn name(&self) -> &str {
        ProviderKind::Gemini.as_str()
    }

    fn default_model(&self) -> &str {
        ProviderKind::Gemini.default_model()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, FlowForgeError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.config.endpoint, request.model, self.config.api_key
        );

        let body = json!({
            "systemInstruction": {"parts": [{"text": request.system_prompt}]},
            "contents": [{"role": "user", "parts": [{"text": request.user_prompt}]}],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        });

        let response = self
            .client
            .post(&url)
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

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FlowForgeError::Provider {
                provider: self.name().to_string(),
                message: "response missing candidates[0].content.parts[0].text".to_string(),
                source: None,
            })
    }
}
