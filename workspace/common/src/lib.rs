//! Common transport-layer types shared between the compute pipeline and the
//! HTTP server. Chart payloads are defined once here so every consumer
//! serializes the same shapes.

mod chart;
mod dataset;

pub use chart::{
    ChartMode, ChartSeries, ChartWindow, LoadChart, LoadPoint, ParseChartModeError, StackedTrace,
};
pub use dataset::DatasetSummary;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

/// Zones preselected when a client does not ask for any.
pub const DEFAULT_ZONES: [&str; 2] = ["ES", "NL"];

/// Smallest and largest number of days a window may span.
pub const MIN_WINDOW_DAYS: i64 = 1;
pub const MAX_WINDOW_DAYS: i64 = 7;
