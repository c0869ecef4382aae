//! AI service facade: policy gate in front of the transport.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::error::PipelineError;
use crate::llm::policy::{ModelPolicy, ModelTier};
use crate::llm::provider::{
    CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmProvider,
};

/// Per-call options for [`AiService::chat`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub tier: ModelTier,
    /// Pin a specific model instead of the tier's configured one.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            tier: ModelTier::Fast,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ChatOptions {
    pub fn quality() -> Self {
        Self {
            tier: ModelTier::Quality,
            ..Self::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of [`AiService::health_check`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHealth {
    pub status: HealthStatus,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One provider plus the policy every call must pass.
pub struct AiService {
    provider: Arc<dyn LlmProvider>,
    policy: ModelPolicy,
}

impl AiService {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: ModelPolicy) -> Self {
        info!(
            provider = provider.name(),
            free_only = policy.free_only(),
            "AI service initialized"
        );
        Self { provider, policy }
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one prompt to the model selected by `options`.
    ///
    /// The policy check happens before the transport is touched.
    pub async fn chat(&self, prompt: &str, options: ChatOptions) -> Result<String, PipelineError> {
        let model = match options.model {
            Some(model) => model,
            None => self.policy.select(options.tier).model_id,
        };
        self.policy.assert_allowed(&model)?;

        let request = CompletionRequest::new(prompt, model)
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature);

        self.provider.complete(request).await.map_err(|e| {
            error!(provider = self.provider.name(), error = %e, "AI chat error");
            PipelineError::Transport(e)
        })
    }

    /// Round-trip a trivial prompt. Never fails; problems are reported in the result.
    pub async fn health_check(&self) -> AiHealth {
        let options = ChatOptions::default().with_max_tokens(10);
        match self.chat("Respond with just \"OK\"", options).await {
            Ok(reply) => AiHealth {
                status: HealthStatus::Healthy,
                provider: self.provider.name().to_string(),
                free_only: Some(self.policy.free_only()),
                fast_model: Some(self.policy.model_for(ModelTier::Fast).to_string()),
                response: Some(reply.chars().take(50).collect()),
                error: None,
            },
            Err(e) => AiHealth {
                status: HealthStatus::Unhealthy,
                provider: self.provider.name().to_string(),
                free_only: None,
                fast_model: None,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}
