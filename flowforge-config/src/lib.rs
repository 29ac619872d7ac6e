//! ABOUTME: Layered configuration for the FlowForge pipeline controller
//! ABOUTME: Precedence: built-in defaults, then an optional TOML file, then `FLOWFORGE_*` env vars

use std::path::Path;
use std::time::Duration;

use flowforge_core::FlowForgeError;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "FLOWFORGE_";

/// Pipeline-wide tunables that are not part of the IR itself: retry budget,
/// timeouts, confidence threshold, and the default LLM provider selection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowForgeConfig {
    /// Provider name used when `compile()` is not given one explicitly.
    pub default_provider: String,
    /// Prompt revision tag passed to the Reasoner.
    pub prompt_version: String,
    /// Maximum Validator-failure retries before escalation (§4.6).
    pub max_retries: u32,
    /// Confidence below which a validated run still escalates (Glossary).
    pub confidence_threshold: f32,
    /// Per-attempt LLM call timeout in seconds (§5).
    pub llm_call_timeout_secs: u64,
    /// Total wall-clock budget for one pipeline run, in seconds (§5).
    pub pipeline_timeout_secs: u64,
    /// Directory used by the file-backed checkpoint sink, if configured.
    pub checkpoint_dir: Option<String>,
}

impl Default for FlowForgeConfig {
    fn default() -> Self {
        Self {
            default_provider: "claude".to_string(),
            prompt_version: "v1".to_string(),
            max_retries: 3,
            confidence_threshold: 0.8,
            llm_call_timeout_secs: 60,
            pipeline_timeout_secs: 120,
            checkpoint_dir: None,
        }
    }
}

impl FlowForgeConfig {
    #[must_use]
    pub fn llm_call_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_call_timeout_secs)
    }

    #[must_use]
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }

    /// Build the layered config: defaults, optionally overridden by `path`'s
    /// TOML contents (if it exists), then by `FLOWFORGE_*` environment
    /// variables. Validation failures surface as `FlowForgeError::Configuration`,
    /// per §7's "the run does not start" rule.
    pub fn load(path: Option<&Path>) -> Result<Self, FlowForgeError> {
        let mut config = Self::default();

        if let Some(path) = path {
            if path.exists() {
                let content = std::fs::read_to_string(path).map_err(|e| FlowForgeError::Configuration {
                    message: format!("failed to read config file {}: {e}", path.display()),
                })?;
                config = toml::from_str(&content).map_err(|e| FlowForgeError::Configuration {
                    message: format!("failed to parse config file {}: {e}", path.display()),
                })?;
                tracing::debug!(path = %path.display(), "loaded flowforge config from file");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `FLOWFORGE_*` overrides in place. Malformed values are logged
    /// and skipped rather than failing the run — only `validate()` is fatal.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(env_var("DEFAULT_PROVIDER")) {
            self.default_provider = v;
        }
        if let Ok(v) = std::env::var(env_var("PROMPT_VERSION")) {
            self.prompt_version = v;
        }
        if let Ok(v) = std::env::var(env_var("CHECKPOINT_DIR")) {
            self.checkpoint_dir = Some(v);
        }
        apply_parsed_env(env_var("MAX_RETRIES"), &mut self.max_retries);
        apply_parsed_env(env_var("CONFIDENCE_THRESHOLD"), &mut self.confidence_threshold);
        apply_parsed_env(env_var("LLM_CALL_TIMEOUT_SECS"), &mut self.llm_call_timeout_secs);
        apply_parsed_env(env_var("PIPELINE_TIMEOUT_SECS"), &mut self.pipeline_timeout_secs);
    }

    /// Range/shape checks over the merged config.
    pub fn validate(&self) -> Result<(), FlowForgeError> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(FlowForgeError::Configuration {
                message: format!("max_retries must be in 1..=10, got {}", self.max_retries),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(FlowForgeError::Configuration {
                message: format!(
                    "confidence_threshold must be in 0.0..=1.0, got {}",
                    self.confidence_threshold
                ),
            });
        }
        if self.llm_call_timeout_secs == 0 {
            return Err(FlowForgeError::Configuration {
                message: "llm_call_timeout_secs must be non-zero".to_string(),
            });
        }
        if self.pipeline_timeout_secs < self.llm_call_timeout_secs {
            return Err(FlowForgeError::Configuration {
                message: "pipeline_timeout_secs must be >= llm_call_timeout_secs".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

fn apply_parsed_env<T: std::str::FromStr>(var: String, slot: &mut T) {
    if let Ok(raw) = std::env::var(&var) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => tracing::warn!(var, raw, "ignoring unparsable env override"),
        }
    }
}
