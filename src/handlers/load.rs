use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
};
use axum_valid::Valid;
use common::LoadChart;
use compute::ChartParams;
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::helpers::errors::{compute_error_response, error_response, ApiError};
use crate::helpers::figure::{figure_html, figure_json};
use crate::helpers::params::chart_params;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, LoadChartQuery};

/// Run the pipeline off the async runtime, bounded by the query permits and
/// the query timeout.
async fn run_pipeline(state: &AppState, params: ChartParams) -> Result<LoadChart, ApiError> {
    trace!("Waiting for a query permit");
    let permit = state.query_permits.clone().acquire_owned().await.map_err(|e| {
        error!("Query permits closed: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "COMPUTE_ERROR",
            "Query execution is unavailable",
        )
    })?;

    let pipeline = state.pipeline.clone();
    // The permit moves into the task so it is held until the scan really ends,
    // even when the request has already timed out.
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.compute_chart(&params)
    });

    match tokio::time::timeout(state.query_timeout, task).await {
        Ok(joined) => task_outcome(joined),
        Err(_) => {
            warn!("Chart computation exceeded {:?}", state.query_timeout);
            Err(error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "MATERIALIZE_TIMEOUT",
                format!(
                    "Chart computation did not finish within {} seconds",
                    state.query_timeout.as_secs()
                ),
            ))
        }
    }
}

fn task_outcome(joined: Result<compute::Result<LoadChart>, JoinError>) -> Result<LoadChart, ApiError> {
    match joined {
        Ok(result) => result.map_err(compute_error_response),
        Err(e) => {
            error!("Chart task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMPUTE_ERROR",
                "Chart computation aborted",
            ))
        }
    }
}

async fn chart_for_query(state: &AppState, query: &LoadChartQuery) -> Result<LoadChart, ApiError> {
    let params = chart_params(query)?;
    debug!(
        "Computing chart - zones: {:?}, start: {}, days: {}, mode: {}",
        params.zones, params.start, params.days, params.mode
    );
    run_pipeline(state, params).await
}

/// Get the demand chart for a set of zones and a time window
#[utoipa::path(
    get,
    path = "/api/v1/load/chart",
    tag = "load",
    params(LoadChartQuery),
    responses(
        (status = 200, description = "Chart computed successfully", body = ApiResponse<LoadChart>),
        (status = 400, description = "Unknown zone, invalid mode, start or days", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 504, description = "Chart computation timed out", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_load_chart(
    Valid(Query(query)): Valid<Query<LoadChartQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LoadChart>>, ApiError> {
    trace!("Entering get_load_chart function");

    let chart = chart_for_query(&state, &query).await?;
    info!(
        "Chart computed - mode: {}, series: {}, warnings: {}",
        chart.mode,
        chart.series_count(),
        chart.warnings.len()
    );

    let message = if chart.warnings.is_empty() {
        "Chart computed successfully".to_string()
    } else {
        format!("Chart computed with {} warning(s)", chart.warnings.len())
    };

    Ok(Json(ApiResponse {
        data: chart,
        message,
        success: true,
    }))
}

/// Get the demand chart as a plotly figure (`data` and `layout`)
#[utoipa::path(
    get,
    path = "/api/v1/load/figure",
    tag = "load",
    params(LoadChartQuery),
    responses(
        (status = 200, description = "Plotly figure JSON", content_type = "application/json"),
        (status = 400, description = "Unknown zone, invalid mode, start or days", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 504, description = "Chart computation timed out", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_load_figure(
    Valid(Query(query)): Valid<Query<LoadChartQuery>>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    trace!("Entering get_load_figure function");

    let chart = chart_for_query(&state, &query).await?;
    let figure = figure_json(&chart).map_err(|e| {
        error!("Failed to serialize figure: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "COMPUTE_ERROR",
            "Failed to render figure",
        )
    })?;

    Ok(Json(figure))
}

/// Get the demand chart as a standalone plotly HTML page
#[utoipa::path(
    get,
    path = "/api/v1/load/figure.html",
    tag = "load",
    params(LoadChartQuery),
    responses(
        (status = 200, description = "Plotly HTML page", body = String, content_type = "text/html"),
        (status = 400, description = "Unknown zone, invalid mode, start or days", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 504, description = "Chart computation timed out", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_load_figure_html(
    Valid(Query(query)): Valid<Query<LoadChartQuery>>,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    trace!("Entering get_load_figure_html function");

    let chart = chart_for_query(&state, &query).await?;
    Ok(Html(figure_html(&chart)))
}
