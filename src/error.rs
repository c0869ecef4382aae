//! Error types for FlowBridge.

use crate::llm::ModelTier;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Model cost-policy violations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error(
        "BLOCKED: {tier} model \"{model}\" is not in the free tier list. \
         Set OPENROUTER_FREE_ONLY=false to use paid models."
    )]
    NotFreeTier { model: String, tier: ModelTier },

    #[error("BLOCKED: Cannot use paid model \"{model}\" in free-only mode")]
    CallRejected { model: String },
}

/// LLM transport errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication not configured for provider {provider}")]
    MissingCredentials { provider: String },
}

/// Failures turning a model reply into a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Could not extract JSON from AI response")]
    NoJson,

    #[error("Malformed JSON in AI response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Structurally invalid webhook input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Categorization failures that escape the fallback boundary.
///
/// Only the batch path surfaces these; a single categorization folds
/// every one of them into the fallback verdict.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid message: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model rejected: {0}")]
    Policy(#[from] PolicyError),

    #[error("Transport failed: {0}")]
    Transport(#[from] LlmError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
