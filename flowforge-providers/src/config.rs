//! ABOUTME: Per-provider HTTP configuration: endpoint, API key, timeout, retry budget
//! ABOUTME: API keys are read once at process init and treated as immutable (§5)

use std::time::Duration;

use flowforge_core::FlowForgeError;

use crate::abstraction::ProviderKind;

#[derive(Debug, Clone)]
pub struct ProviderHttpConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    /// Network-level retries independent of the pipeline's own retry counter (§4.2).
    pub max_network_retries: u32,
}

impl ProviderHttpConfig {
    /// Build config for `kind`, reading the API key from its documented
    /// environment variable (§6). Fails with `ConfigurationError` if unset —
    /// per §7, configuration errors surface immediately and the run never starts.
    pub fn from_env(kind: ProviderKind) -> Result<Self, FlowForgeError> {
        let var = kind.api_key_env_var();
        let api_key = std::env::var(var).map_err(|_| FlowForgeError::Configuration {
            message: format!("missing API key: environment variable `{var}` is not set"),
        })?;

        Ok(Self {
            kind,
            api_key,
            endpoint: default_endpoint(kind),
            timeout: Duration::from_secs(60),
            max_network_retries: 2,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_endpoint(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::Claude => "https://api.anthropic.com/v1/messages".to_string(),
        ProviderKind::Aimlapi => "https://api.aimlapi.com/v1/chat/completions".to_string(),
        ProviderKind::Gemini => {
            "https://generativelanguage.googleapis.com/v1beta/models".to_string()
        }
    }
}
