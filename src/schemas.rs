pub use common::ApiResponse;
use common::{ChartMode, ChartSeries, ChartWindow, DatasetSummary, LoadChart, LoadPoint, StackedTrace};
use compute::DemandPipeline;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::config::QueryLimits;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Chart pipeline over the read-only demand dataset
    pub pipeline: DemandPipeline,
    /// Bounds the number of materializations running at once
    pub query_permits: Arc<Semaphore>,
    /// Upper bound for a single materialization
    pub query_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: DemandPipeline, limits: &QueryLimits) -> Self {
        Self {
            pipeline,
            query_permits: Arc::new(Semaphore::new(limits.max_concurrent_queries.max(1))),
            query_timeout: Duration::from_secs(limits.query_timeout_secs.max(1)),
        }
    }
}

/// Query parameters for the load chart endpoints
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema, IntoParams)]
pub struct LoadChartQuery {
    /// Comma separated zone codes (default: ES,NL). An empty value selects no zone.
    pub zones: Option<String>,
    /// Start of the window: YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] (UTC) or RFC 3339 (default: 2020-01-01)
    pub start: Option<String>,
    /// Window length in days, 1 to 7 (default: 1)
    #[validate(range(min = 1, max = 7))]
    pub days: Option<i64>,
    /// Chart mode: raw, scaled-range, scaled-total or stacked (default: raw)
    pub mode: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Number of zones in the loaded dataset
    pub zones: usize,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::zones::get_zones,
        crate::handlers::load::get_load_chart,
        crate::handlers::load::get_load_figure,
        crate::handlers::load::get_load_figure_html,
    ),
    components(
        schemas(
            ApiResponse<LoadChart>,
            ApiResponse<DatasetSummary>,
            ErrorResponse,
            HealthResponse,
            LoadChartQuery,
            LoadChart,
            ChartMode,
            ChartWindow,
            ChartSeries,
            LoadPoint,
            StackedTrace,
            DatasetSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "zones", description = "Dataset and zone discovery"),
        (name = "load", description = "Electricity demand charts"),
    ),
    info(
        title = "gridload API",
        description = "Electricity demand dashboard API - windowed, scaled and stacked load charts per zone",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
