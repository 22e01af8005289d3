//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{HealthCheckResult, HealthCheckable};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheckResult>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Vec::new(),
    })
}

/// Readiness check (includes the storage adapters)
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = vec![
        state.ports.property.health_check().await,
        state.ports.periods.health_check().await,
        state.ports.payments.health_check().await,
    ];

    let ready = checks.iter().all(HealthCheckResult::is_operational);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks,
        }),
    )
}
