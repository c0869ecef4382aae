//! LLM integration for FlowBridge.
//!
//! Supports:
//! - **OpenRouter**: hosted chat completions, optionally restricted to free models
//! - **Ollama**: local inference
//!
//! The backend is picked once at startup by [`create_provider`]; callers only
//! ever see `Arc<dyn LlmProvider>`.

pub mod ollama;
pub mod openrouter;
pub mod policy;
pub mod provider;
pub mod service;

pub use ollama::OllamaProvider;
pub use openrouter::OpenRouterProvider;
pub use policy::{FREE_MODELS, ModelPolicy, ModelSelection, ModelTier};
pub use provider::{CompletionRequest, LlmProvider};
pub use service::{AiHealth, AiService, ChatOptions, HealthStatus};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenRouter,
    Ollama,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::InvalidValue {
                key: "AI_PROVIDER".into(),
                message: format!("unknown AI provider '{other}' (expected openrouter or ollama)"),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: Option<secrecy::SecretString>,
    pub openrouter_base_url: Option<String>,
    pub ollama_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenRouter => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| LlmError::MissingCredentials {
                    provider: LlmBackend::OpenRouter.to_string(),
                })?;
            tracing::info!("Using OpenRouter");
            Ok(Arc::new(OpenRouterProvider::new(
                api_key,
                config.openrouter_base_url.clone(),
            )))
        }
        LlmBackend::Ollama => {
            tracing::info!("Using Ollama");
            Ok(Arc::new(OllamaProvider::new(config.ollama_url.clone())))
        }
    }
}
