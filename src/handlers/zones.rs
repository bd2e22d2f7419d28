use axum::{extract::State, response::Json};
use common::DatasetSummary;
use tracing::{info, instrument, trace};

use crate::schemas::{ApiResponse, AppState};

/// Describe the loaded dataset: available zones and time coverage
#[utoipa::path(
    get,
    path = "/api/v1/zones",
    tag = "zones",
    responses(
        (status = 200, description = "Dataset summary retrieved successfully", body = ApiResponse<DatasetSummary>)
    )
)]
#[instrument(skip(state))]
pub async fn get_zones(State(state): State<AppState>) -> Json<ApiResponse<DatasetSummary>> {
    trace!("Entering get_zones function");

    let summary = state.pipeline.dataset().summary();
    info!("Returning {} zones from {}", summary.zone_count(), summary.source);

    Json(ApiResponse {
        data: summary,
        message: "Dataset summary retrieved successfully".to_string(),
        success: true,
    })
}
