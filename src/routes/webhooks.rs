//! Channel webhooks.
//!
//! Every POST goes the same way: adapter → categorizer → JSON reply.
//! Providers get a 200 for anything they send; only the direct test channel
//! can answer 400.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::channels::whatsapp::VerifyParams;
use crate::channels::{
    Adapted, ChannelAdapter, DirectAdapter, EmailAdapter, SmsAdapter, Verification,
    WhatsAppAdapter, verify_subscription,
};
use crate::pipeline::CategorizationContext;

pub(super) fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(webhooks_health))
        .route("/test", post(test_webhook))
        .route("/openphone", post(openphone_webhook))
        .route("/gmail", post(gmail_webhook))
        .route("/whatsapp", get(whatsapp_verify).post(whatsapp_webhook))
}

/// GET /webhooks/health
async fn webhooks_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "channels": ["test", "sms", "email", "whatsapp"],
        "endpoints": {
            "test": "POST /webhooks/test",
            "openphone": "POST /webhooks/openphone",
            "gmail": "POST /webhooks/gmail",
            "whatsapp": "GET|POST /webhooks/whatsapp"
        }
    }))
}

/// POST /webhooks/test
async fn test_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(&state, &DirectAdapter, body).await
}

/// POST /webhooks/openphone
async fn openphone_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(&state, &SmsAdapter, body).await
}

/// POST /webhooks/gmail
async fn gmail_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(&state, &EmailAdapter, body).await
}

/// POST /webhooks/whatsapp
async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(&state, &WhatsAppAdapter, body).await
}

/// GET /webhooks/whatsapp (Meta subscription handshake)
async fn whatsapp_verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match verify_subscription(&params, state.whatsapp_verify_token.as_ref()) {
        Verification::Accepted(challenge) => {
            info!("WhatsApp webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        Verification::Forbidden => {
            info!(mode = ?params.mode, "WhatsApp webhook verification rejected");
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    adapter: &dyn ChannelAdapter,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let channel = adapter.channel();
    let span = info_span!("webhook", request_id = %Uuid::new_v4(), %channel);
    process(state, adapter, body).instrument(span).await
}

async fn process(
    state: &AppState,
    adapter: &dyn ChannelAdapter,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    // An unreadable body is left to the adapter: null is a skip for
    // provider channels and a 400 for the direct one.
    let payload = body.map(|Json(v)| v).unwrap_or_else(|rejection| {
        debug!(error = %rejection.body_text(), "Webhook body is not JSON");
        Value::Null
    });

    let message = match adapter.adapt(payload)? {
        Adapted::Message(message) => message,
        Adapted::Skip(skip) => {
            debug!(reason = %skip.reason, "Webhook skipped");
            return Ok(Json(json!({ "received": true, "note": skip.reason })).into_response());
        }
    };

    info!(from = %message.from, "Webhook message received");
    let result = state
        .categorizer
        .categorize(message, &CategorizationContext::default())
        .await;

    Ok(Json(json!({
        "success": true,
        "result": result,
        "message": "Message categorized successfully",
    }))
    .into_response())
}
