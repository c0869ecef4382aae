//! The transport capability every LLM backend implements.

use async_trait::async_trait;

use crate::error::LlmError;

/// Default completion budget when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// An LLM backend: hosted API or local inference.
///
/// Implementations do one attempt per call. They never retry and never
/// inspect the model id beyond what the wire format needs.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Backend label used in logs and health output (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Send the prompt and return the model's raw text reply.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
