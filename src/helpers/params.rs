use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use common::{ChartMode, DEFAULT_ZONES};
use compute::ChartParams;

use crate::helpers::errors::{error_response, ApiError};
use crate::schemas::LoadChartQuery;

/// Window start used when a request does not name one.
pub const DEFAULT_START: &str = "2020-01-01";

/// Parses a window start.
///
/// Accepts a plain date (midnight UTC), a naive date-time read as UTC, or an
/// RFC 3339 timestamp converted to UTC.
pub fn parse_start(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Splits a comma separated zone list. `None` selects the default zones.
pub fn parse_zones(value: Option<&str>) -> Vec<String> {
    match value {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_ZONES.iter().map(|zone| zone.to_string()).collect(),
    }
}

pub fn parse_mode(value: Option<&str>) -> Result<ChartMode, ApiError> {
    match value {
        Some(mode) => mode
            .parse::<ChartMode>()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, "INVALID_MODE", e.to_string())),
        None => Ok(ChartMode::default()),
    }
}

/// Builds pipeline parameters from a validated query string.
pub fn chart_params(query: &LoadChartQuery) -> Result<ChartParams, ApiError> {
    let start_raw = query.start.as_deref().unwrap_or(DEFAULT_START);
    let start = parse_start(start_raw).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_START",
            format!(
                "Invalid start '{}', expected YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339",
                start_raw
            ),
        )
    })?;
    let mode = parse_mode(query.mode.as_deref())?;
    let zones = parse_zones(query.zones.as_deref());

    Ok(ChartParams::new(zones, start, query.days.unwrap_or(1), mode))
}
