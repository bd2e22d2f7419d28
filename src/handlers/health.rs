use axum::{extract::State, response::Json};
use tracing::{debug, instrument};
use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // The dataset is opened at startup, so a running server always has one
    let zones = state.pipeline.dataset().zones().len();
    debug!("Health check, {} zones available", zones);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        zones,
    })
}
