use axum::{http::StatusCode, response::Json};
use compute::ComputeError;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a pipeline failure to the response the client sees.
///
/// Unknown zones are the caller's fault; everything else is reported as an
/// internal error without leaking dataset internals beyond the message.
pub fn compute_error_response(err: ComputeError) -> ApiError {
    match err {
        ComputeError::UnknownZone(_) => {
            warn!("Chart request rejected: {}", err);
            error_response(StatusCode::BAD_REQUEST, "UNKNOWN_ZONE", err.to_string())
        }
        other => {
            error!("Chart computation failed: {}", other);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMPUTE_ERROR",
                format!("Failed to compute chart: {}", other),
            )
        }
    }
}
