//! HTTP surface: service descriptor, health checks, channel webhooks.

mod health;
mod webhooks;

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{self, ValidationError};
use crate::llm::{AiService, ModelPolicy, ModelTier, create_provider};
use crate::pipeline::Categorizer;

/// Shared state for every route.
pub struct AppState {
    pub categorizer: Arc<Categorizer>,
    /// WhatsApp subscription secret; `None` refuses every handshake.
    pub whatsapp_verify_token: Option<SecretString>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        categorizer: Arc<Categorizer>,
        whatsapp_verify_token: Option<SecretString>,
    ) -> Self {
        Self {
            categorizer,
            whatsapp_verify_token,
            started_at: Instant::now(),
        }
    }
}

/// Errors a handler reports to the webhook caller.
#[derive(Debug)]
pub enum ApiError {
    /// Structurally invalid input (400).
    Validation(ValidationError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(e) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
            }
        }
    }
}

/// Assemble the service from configuration.
///
/// Fails when the provider cannot be built or, in free-only mode, when a
/// configured model is not on the allow-list. Nothing is served in that case.
pub fn build(config: &AppConfig) -> error::Result<Router> {
    let provider = create_provider(&config.llm)?;
    let policy = ModelPolicy::new(
        config.fast_model.clone(),
        config.quality_model.clone(),
        config.restrict_to_free_tier(),
    )?;
    let ai = Arc::new(AiService::new(provider, policy));
    tracing::info!(
        provider = ai.provider_name(),
        free_only = ai.policy().free_only(),
        fast_model = ai.policy().model_for(ModelTier::Fast),
        quality_model = ai.policy().model_for(ModelTier::Quality),
        "Categorizer ready"
    );

    let categorizer = Arc::new(Categorizer::new(ai));
    Ok(app(AppState::new(
        categorizer,
        config.whatsapp_verify_token.clone(),
    )))
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/health/ai", get(health::ai_health))
        .nest("/webhooks", webhooks::webhook_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(internal_error))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Unrecoverable handler failure → 500 `{error, message}`.
fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown error".to_string()
    };
    tracing::error!(%message, "Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "message": message })),
    )
        .into_response()
}
