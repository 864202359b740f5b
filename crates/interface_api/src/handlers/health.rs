//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{AdapterHealth, HealthCheckResult};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: HealthCheckResult,
}

/// Health check endpoint; 503 when the store is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.health.health_check().await;

    let (code, status) = match store.status {
        AdapterHealth::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        AdapterHealth::Degraded => (StatusCode::OK, "degraded"),
        _ => (StatusCode::OK, "healthy"),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
        }),
    )
}
