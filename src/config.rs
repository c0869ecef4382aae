//! Configuration types.
//!
//! Everything is read once at startup into an immutable [`AppConfig`] and
//! passed down explicitly. Nothing else in the crate reads the environment.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

pub const DEFAULT_FAST_MODEL: &str = "deepseek/deepseek-r1:free";
pub const DEFAULT_QUALITY_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_PORT: u16 = 3002;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Which backend to talk to and how to reach it.
    pub llm: LlmConfig,
    /// Model id for the fast tier (categorization).
    pub fast_model: String,
    /// Model id for the quality tier (summaries).
    pub quality_model: String,
    /// `OPENROUTER_FREE_ONLY` as set.
    pub free_only: bool,
    /// Secret the WhatsApp webhook handshake must present.
    pub whatsapp_verify_token: Option<SecretString>,
    /// HTTP listen port.
    pub port: u16,
}

impl AppConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend: LlmBackend = match get("AI_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmBackend::OpenRouter,
        };

        let api_key = get("OPENROUTER_API_KEY").map(SecretString::from);
        if backend == LlmBackend::OpenRouter && api_key.is_none() {
            return Err(ConfigError::MissingRequired {
                key: "OPENROUTER_API_KEY".into(),
                hint: "Set it or switch AI_PROVIDER to ollama.".into(),
            });
        }

        // Only the literal `true` turns the restriction on.
        let free_only = get("OPENROUTER_FREE_ONLY").is_some_and(|v| v == "true");

        let port = match get("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("'{value}' is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key,
                openrouter_base_url: get("OPENROUTER_BASE_URL"),
                ollama_url: get("OLLAMA_URL"),
            },
            fast_model: get("AI_MODEL_FAST").unwrap_or_else(|| DEFAULT_FAST_MODEL.to_string()),
            quality_model: get("AI_MODEL_QUALITY")
                .unwrap_or_else(|| DEFAULT_QUALITY_MODEL.to_string()),
            free_only,
            whatsapp_verify_token: get("WHATSAPP_VERIFY_TOKEN").map(SecretString::from),
            port,
        })
    }

    /// Whether the free-tier allow-list applies.
    ///
    /// Local inference has no per-token cost, so only the hosted backend is restricted.
    pub fn restrict_to_free_tier(&self) -> bool {
        self.free_only && self.llm.backend == LlmBackend::OpenRouter
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_api_key() {
        let config = config_from(&[("OPENROUTER_API_KEY", "sk-or-1")]).unwrap();
        assert_eq!(config.llm.backend, LlmBackend::OpenRouter);
        assert_eq!(config.fast_model, DEFAULT_FAST_MODEL);
        assert_eq!(config.quality_model, DEFAULT_QUALITY_MODEL);
        assert_eq!(config.port, 3002);
        assert!(!config.free_only);
        assert!(config.whatsapp_verify_token.is_none());
        assert_eq!(
            config.llm.api_key.as_ref().unwrap().expose_secret(),
            "sk-or-1"
        );
    }

    #[test]
    fn openrouter_without_key_fails() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired { ref key, .. } if key == "OPENROUTER_API_KEY"
        ));
    }

    #[test]
    fn empty_key_counts_as_missing() {
        assert!(config_from(&[("OPENROUTER_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = config_from(&[
            ("AI_PROVIDER", "ollama"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OPENROUTER_FREE_ONLY", "true"),
        ])
        .unwrap();
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.ollama_url.as_deref(), Some("http://gpu-box:11434"));
        assert!(config.free_only);
        assert!(!config.restrict_to_free_tier());
    }

    #[test]
    fn unknown_provider_fails() {
        let err = config_from(&[("AI_PROVIDER", "bedrock")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn full_configuration() {
        let config = config_from(&[
            ("AI_PROVIDER", "openrouter"),
            ("OPENROUTER_API_KEY", "sk-or-2"),
            ("OPENROUTER_FREE_ONLY", "true"),
            ("AI_MODEL_FAST", "mistralai/mistral-7b-instruct:free"),
            ("AI_MODEL_QUALITY", "meta-llama/llama-3.1-8b-instruct:free"),
            ("WHATSAPP_VERIFY_TOKEN", "hunter2"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert!(config.restrict_to_free_tier());
        assert_eq!(config.fast_model, "mistralai/mistral-7b-instruct:free");
        assert_eq!(config.quality_model, "meta-llama/llama-3.1-8b-instruct:free");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.whatsapp_verify_token.as_ref().unwrap().expose_secret(),
            "hunter2"
        );
    }

    #[test]
    fn invalid_port_fails() {
        assert!(config_from(&[("OPENROUTER_API_KEY", "k"), ("PORT", "http")]).is_err());
    }

    #[test]
    fn free_only_needs_literal_true() {
        for value in ["maybe", "1", "yes", "TRUE", "false"] {
            let config =
                config_from(&[("OPENROUTER_API_KEY", "k"), ("OPENROUTER_FREE_ONLY", value)])
                    .unwrap();
            assert!(!config.free_only, "OPENROUTER_FREE_ONLY={value}");
        }
        let config =
            config_from(&[("OPENROUTER_API_KEY", "k"), ("OPENROUTER_FREE_ONLY", "true")]).unwrap();
        assert!(config.free_only);
    }
}
