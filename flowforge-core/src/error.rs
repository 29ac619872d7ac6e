//! ABOUTME: Error taxonomy shared across all FlowForge pipeline components
//! ABOUTME: Maps onto the error envelope surfaced to HTTP/CLI collaborators

use thiserror::Error;

/// One error produced during `Validator` traversal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    /// Dotted path into the IR where the violation was found, e.g.
    /// `workflow.if_branch.steps[1].parameters.customer_id`.
    pub path: String,
    /// Stable machine-readable code, e.g. `UNSAFE_CONDITION`, `UNKNOWN_VARIABLE`.
    pub code: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// A non-fatal validator observation that does not block a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub code: String,
    pub message: String,
}

/// Top-level error taxonomy for the FlowForge pipeline.
///
/// Each variant corresponds to one entry in the error envelope's
/// `error_type` field (`ValidationError`, `ParsingError`, `GenerationError`,
/// `ConfigurationError`, `ProviderError`, `EscalationRequired`,
/// `SerializationError`).
#[derive(Debug, Error)]
pub enum FlowForgeError {
    #[error("parsing error: {message}")]
    Parsing { message: String },

    #[error("validation error: {} violation(s)", errors.len())]
    Validation { errors: Vec<ValidationError> },

    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("generation error: {message}")]
    Generation { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("escalation required after {retry_count} retries: {}", last_errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    EscalationRequired {
        retry_count: u32,
        last_errors: Vec<ValidationError>,
        confidence: f32,
    },
}

impl FlowForgeError {
    /// Stable tag used by the `{success: false, error_type, ...}` envelope in §6.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Parsing { .. } => "ParsingError",
            Self::Validation { .. } => "ValidationError",
            Self::Provider { .. } => "ProviderError",
            Self::Generation { .. } => "GenerationError",
            Self::Serialization { .. } => "SerializationError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::EscalationRequired { .. } => "EscalationRequired",
        }
    }

    /// Whether the controller is permitted to retry the Reasoner on this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Parsing { .. } | Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, FlowForgeError>;
