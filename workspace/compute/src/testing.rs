//! Synthetic demand frames for tests.
//!
//! Shared with the server crate through the `testing` feature so HTTP tests
//! run against the same data shape as the pipeline tests.

use chrono::{DateTime, Duration, Utc};
use polars::prelude::*;

use crate::dataset::DemandDataset;
use crate::window::to_epoch;

/// Timestamp column name used by every synthetic frame.
pub const TIMESTAMP_COLUMN: &str = "utc_timestamp";

/// Deterministic hourly load for a zone.
///
/// Each zone has its own base level, a daily profile peaking in the evening
/// and a slow upward drift, so later days always exceed earlier ones.
pub fn synthetic_value(zone_index: usize, hour: usize) -> f64 {
    let base = 1_000.0 * (zone_index as f64 + 1.0);
    let hour_of_day = (hour % 24) as f64;
    let profile = 200.0 - (hour_of_day - 19.0).abs() * 8.0;
    let drift = 15.0 * (hour / 24) as f64;
    base + profile + drift
}

/// Hourly frame starting at `start` with `hours` rows and one column per zone.
pub fn synthetic_frame(start: DateTime<Utc>, hours: usize, zones: &[&str]) -> DataFrame {
    let columns: Vec<(&str, Vec<Option<f64>>)> = zones
        .iter()
        .enumerate()
        .map(|(i, zone)| (*zone, (0..hours).map(|h| Some(synthetic_value(i, h))).collect()))
        .collect();
    frame_from_columns(start, Duration::hours(1), hours, &columns)
}

/// Frame with `rows` timestamps spaced by `step` and the given zone columns.
///
/// The timestamp column is a timezone-naive millisecond datetime, which the
/// dataset reads as UTC.
pub fn frame_from_columns(
    start: DateTime<Utc>,
    step: Duration,
    rows: usize,
    columns: &[(&str, Vec<Option<f64>>)],
) -> DataFrame {
    frame_with_time_unit(TimeUnit::Milliseconds, start, step, rows, columns)
}

/// Same as [`frame_from_columns`] with the timestamp column stored in `unit`.
pub fn frame_with_time_unit(
    unit: TimeUnit,
    start: DateTime<Utc>,
    step: Duration,
    rows: usize,
    columns: &[(&str, Vec<Option<f64>>)],
) -> DataFrame {
    let timestamps: Vec<i64> = (0..rows as i32)
        .map(|i| to_epoch(start + step * i, unit))
        .collect();
    let timestamps = Series::new(TIMESTAMP_COLUMN.into(), timestamps)
        .cast(&DataType::Datetime(unit, None))
        .expect("Failed to build timestamp column");

    let mut frame_columns: Vec<Column> = vec![timestamps.into()];
    for (zone, values) in columns {
        assert_eq!(values.len(), rows, "column {} has the wrong length", zone);
        frame_columns.push(Series::new((*zone).into(), values.clone()).into());
    }

    DataFrame::new(frame_columns).expect("Failed to build synthetic frame")
}

/// Dataset of `days` full days of hourly synthetic data.
pub fn synthetic_dataset(start: DateTime<Utc>, days: usize, zones: &[&str]) -> DemandDataset {
    let df = synthetic_frame(start, days * 24, zones);
    DemandDataset::from_lazy(df.lazy(), Some(TIMESTAMP_COLUMN), "synthetic")
        .expect("Failed to build synthetic dataset")
}
