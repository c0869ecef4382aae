//! Local backend: Ollama's `/api/generate` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, LlmProvider};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const PROVIDER: &str = "ollama";

pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Ollama tags don't carry OpenRouter's `:free` marker.
fn local_model_name(model: &str) -> &str {
    model.strip_suffix(":free").unwrap_or(model)
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let model = local_model_name(&request.model);
        let body = serde_json::json!({
            "model": model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });

        debug!(model = %model, length = request.prompt.len(), "Ollama chat");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "Ollama API error");
            return Err(LlmError::Status {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body: text,
            });
        }

        let api_resp: ApiResponse = resp.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.into(),
            reason: e.to_string(),
        })?;

        Ok(api_resp.response)
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    response: String,
}
