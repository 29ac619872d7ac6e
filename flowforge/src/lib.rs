//! ABOUTME: FlowForge's public entry point — wires Parser/Reasoner/Validator/Serializer/Generator
//! ABOUTME: into the one `compile()` operation external collaborators call (§6)

use std::sync::Arc;

use flowforge_config::FlowForgeConfig;
use flowforge_orchestrator::{PipelineController, PipelineResult};
use flowforge_orchestrator::checkpoint::CheckpointSink;
use flowforge_orchestrator::state_machine::ExecutionStatus;
use flowforge_providers::{build_provider, ProviderInstance, ProviderKind};
use tokio_util::sync::CancellationToken;

/// `{success, error, error_type, details}` envelope handed back to HTTP/CLI
/// collaborators on any non-`complete` outcome (§6, §7).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub error_type: &'static str,
    pub details: serde_json::Value,
}

/// Everything `compile()` can return, collapsing `PipelineResult` into the
/// success/error shape described in §6.
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    Success(PipelineResult),
    Escalated(PipelineResult),
    Failed(ErrorEnvelope),
}

impl CompileOutcome {
    #[must_use]
    pub fn generated_code(&self) -> Option<&str> {
        match self {
            Self::Success(result) => result.generated_code.as_deref(),
            _ => None,
        }
    }
}

/// Initialize tracing once at process startup. Respects `RUST_LOG`, defaulting
/// to `info` when unset — callers embedding FlowForge in a larger process may
/// skip this and install their own subscriber instead.
pub fn init_tracing() -> Result<(), anyhow::Error> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}

/// §6 programmatic entry point: `compile(raw_spec, provider?, model_version?, prompt_version?, checkpoint_sink?) -> Result`.
///
/// `provider` selects one of `claude`/`aimlapi`/`gemini` (default: the
/// config's `default_provider`); its API key is read from the environment at
/// call time. A missing/unknown provider or missing key surfaces immediately
/// as `ConfigurationError` — the run never starts, per §7.
pub async fn compile(
    raw_spec: &str,
    provider: Option<&str>,
    model_version: Option<&str>,
    prompt_version: Option<&str>,
    checkpoint_sink: Option<Arc<dyn CheckpointSink>>,
) -> CompileOutcome {
    let config = match FlowForgeConfig::load(None) {
        Ok(config) => config,
        Err(err) => return CompileOutcome::Failed(to_envelope(&err)),
    };

    let provider_name = provider.unwrap_or(&config.default_provider);
    let Some(kind) = ProviderKind::parse(provider_name) else {
        return CompileOutcome::Failed(ErrorEnvelope {
            success: false,
            error: format!("unknown provider `{provider_name}`"),
            error_type: "ConfigurationError",
            details: serde_json::json!({"provider": provider_name}),
        });
    };

    let provider: Arc<dyn ProviderInstance> = match build_provider(kind) {
        Ok(provider) => provider,
        Err(err) => return CompileOutcome::Failed(to_envelope(&err)),
    };

    let mut controller = PipelineController::new(provider, config);
    if let Some(sink) = checkpoint_sink {
        controller = controller.with_checkpoint_sink(sink);
    }

    let result = controller
        .compile(raw_spec, model_version, prompt_version, CancellationToken::new())
        .await;

    match result.status {
        ExecutionStatus::Complete => CompileOutcome::Success(result),
        ExecutionStatus::Escalated => CompileOutcome::Escalated(result),
        _ => {
            let error_type = result
                .error_type
                .expect("Failed/Escalated-other status always carries an error_type");
            CompileOutcome::Failed(ErrorEnvelope {
                success: false,
                error: result.errors.join("; "),
                error_type,
                details: result.metadata,
            })
        }
    }
}

fn to_envelope(err: &flowforge_core::FlowForgeError) -> ErrorEnvelope {
    ErrorEnvelope {
        success: false,
        error: err.to_string(),
        error_type: err.error_type(),
        details: serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_provider_is_a_configuration_error() {
        let outcome = compile("Workflow: x\n", Some("not-a-provider"), None, None, None).await;
        match outcome {
            CompileOutcome::Failed(envelope) => {
                assert_eq!(envelope.error_type, "ConfigurationError");
            }
            other => panic!("expected ConfigurationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        std::env::remove_var("ANTHROPIC_API_KEY");
        let outcome = compile("Workflow: x\n", Some("claude"), None, None, None).await;
        match outcome {
            CompileOutcome::Failed(envelope) => {
                assert_eq!(envelope.error_type, "ConfigurationError");
            }
            other => panic!("expected ConfigurationError, got {other:?}"),
        }
    }
}
