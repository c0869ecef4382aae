use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use super::AppState;
use crate::llm::HealthStatus;

/// GET /
pub(super) async fn index() -> impl IntoResponse {
    Json(json!({
        "name": "FlowBridge",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "AI-powered property communication automation",
        "endpoints": {
            "health": "/health",
            "webhooks": "/webhooks/*"
        }
    }))
}

/// GET /health
pub(super) async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

/// GET /health/ai
///
/// Round-trips a trivial prompt through the configured provider.
/// 503 when the provider or policy gate rejects it.
pub(super) async fn ai_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.categorizer.ai().health_check().await;
    let status = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}
