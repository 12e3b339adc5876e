use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Health check endpoint for liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "events-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check endpoint. Not ready until an upstream key is configured;
/// never calls the upstream.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.config.has_credential() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
