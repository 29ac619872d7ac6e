//! ABOUTME: LLM provider abstraction and concrete backends for the Reasoner (§6)
//! ABOUTME: Provider instances are process-wide and safe for concurrent use (§5)

pub mod abstraction;
pub mod aimlapi;
pub mod claude;
pub mod config;
pub mod gemini;
pub mod mock;

use std::sync::Arc;

use flowforge_core::FlowForgeError;

pub use abstraction::{CompletionRequest, ProviderInstance, ProviderKind, ProviderRegistry};
pub use config::ProviderHttpConfig;

/// Build a live provider instance for `kind`, reading its API key from the
/// environment (§6). This is the process-init-time constructor; the returned
/// instance is immutable and safe to share across concurrent runs.
pub fn build_provider(kind: ProviderKind) -> Result<Arc<dyn ProviderInstance>, FlowForgeError> {
    let config = ProviderHttpConfig::from_env(kind)?;
    Ok(match kind {
        ProviderKind::Claude => Arc::new(claude::ClaudeProvider::new(config)),
        ProviderKind::Aimlapi => Arc::new(aimlapi::AimlapiProvider::new(config)),
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(config)),
    })
}
