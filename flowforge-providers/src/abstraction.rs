//! ABOUTME: Provider-agnostic completion trait and the named-provider registry
//! ABOUTME: Mirrors the capability/config split of a conventional provider abstraction layer

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use flowforge_core::FlowForgeError;

/// Request shape for a single completion call (§6 `complete`).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait implemented by every provider backend.
#[async_trait]
pub trait ProviderInstance: Send + Sync {
    /// Provider name as selected in `compile(provider = ...)`.
    fn name(&self) -> &str;

    /// Default model for this provider, used when the caller does not
    /// override `model_version`.
    fn default_model(&self) -> &str;

    /// Execute one completion request and return the raw text response.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FlowForgeError>;
}

/// Selector for the three named providers from §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Claude,
    Aimlapi,
    Gemini,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Aimlapi => "aimlapi",
            Self::Gemini => "gemini",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "claude" => Self::Claude,
            "aimlapi" => Self::Aimlapi,
            "gemini" => Self::Gemini,
            _ => return None,
        })
    }

    /// Default model id per §6.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Claude => "claude-haiku-4-5",
            Self::Aimlapi => "x-ai/grok-4-fast-reasoning",
            Self::Gemini => "gemini-2.5-pro",
        }
    }

    /// Environment variable the provider reads its API key from.
    #[must_use]
    pub const fn api_key_env_var(self) -> &'static str {
        match self {
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::Aimlapi => "AIMLAPI_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Registry mapping provider names to live instances, built once at process
/// init and treated as read-only thereafter (§5 "Shared resources").
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    instances: HashMap<String, Arc<dyn ProviderInstance>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instance: Arc<dyn ProviderInstance>) {
        self.instances.insert(instance.name().to_string(), instance);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderInstance>> {
        self.instances.get(name).cloned()
    }

    #[must_use]
    pub fn available(&self) -> Vec<&str> {
        self.instances.keys().map(String::as_str).collect()
    }
}
