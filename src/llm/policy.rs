//! Model policy gate: tier → model mapping and the free-tier allow-list.
//!
//! The allow-list check runs twice: once when the policy is built (a paid
//! model in the configuration stops the service from starting) and again
//! on every call, before any request leaves the process.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::PolicyError;

/// Verified free-tier model identifiers.
///
/// Free models can be rate-limited or temporarily unavailable upstream.
pub const FREE_MODELS: &[&str] = &[
    "mistralai/mistral-7b-instruct:free",
    "deepseek/deepseek-r1:free",
    "google/gemini-2.0-flash-exp:free",
    "meta-llama/llama-3.1-8b-instruct:free",
    "nousresearch/hermes-3-llama-3.1-405b:free",
];

/// Quality/cost level a request runs at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Fast,
    Quality,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Quality => "quality",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model chosen for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelection {
    pub model_id: String,
    pub tier: ModelTier,
}

/// Tier → model mapping plus the optional free-tier restriction.
#[derive(Debug, Clone)]
pub struct ModelPolicy {
    fast_model: String,
    quality_model: String,
    free_only: bool,
    allow_list: Vec<String>,
}

impl ModelPolicy {
    /// Build a policy against the built-in [`FREE_MODELS`] list.
    pub fn new(
        fast_model: impl Into<String>,
        quality_model: impl Into<String>,
        free_only: bool,
    ) -> Result<Self, PolicyError> {
        Self::with_allow_list(fast_model, quality_model, free_only, FREE_MODELS.iter().copied())
    }

    /// Build a policy against a custom allow-list.
    ///
    /// Fails when `free_only` is set and either configured model is missing
    /// from the list.
    pub fn with_allow_list<I, S>(
        fast_model: impl Into<String>,
        quality_model: impl Into<String>,
        free_only: bool,
        allow_list: I,
    ) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy = Self {
            fast_model: fast_model.into(),
            quality_model: quality_model.into(),
            free_only,
            allow_list: allow_list.into_iter().map(Into::into).collect(),
        };

        if policy.free_only {
            for tier in [ModelTier::Fast, ModelTier::Quality] {
                let model = policy.model_for(tier);
                if !policy.is_listed(model) {
                    let err = PolicyError::NotFreeTier {
                        model: model.to_string(),
                        tier,
                    };
                    error!("{err}");
                    return Err(err);
                }
            }
            info!("Free-only mode: all models validated as free tier");
        }

        Ok(policy)
    }

    /// Model id configured for a tier.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Quality => &self.quality_model,
        }
    }

    pub fn select(&self, tier: ModelTier) -> ModelSelection {
        ModelSelection {
            model_id: self.model_for(tier).to_string(),
            tier,
        }
    }

    /// Reject a model before transport when the free-tier restriction is on.
    pub fn assert_allowed(&self, model: &str) -> Result<(), PolicyError> {
        if self.free_only && !self.is_listed(model) {
            return Err(PolicyError::CallRejected {
                model: model.to_string(),
            });
        }
        Ok(())
    }

    pub fn free_only(&self) -> bool {
        self.free_only
    }

    fn is_listed(&self, model: &str) -> bool {
        self.allow_list.iter().any(|m| m == model)
    }
}
