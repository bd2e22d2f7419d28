use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::window::{from_epoch, TimeWindow};

/// Logical query against the dataset: a projection plus a time range filter.
///
/// Building a `LoadQuery` does no I/O. The scan happens once, in [`LoadQuery::materialize`].
pub struct LoadQuery {
    frame: LazyFrame,
    timestamp_column: String,
    time_unit: TimeUnit,
    zones: Vec<String>,
    window: TimeWindow,
}

impl LoadQuery {
    pub(crate) fn new(
        frame: LazyFrame,
        timestamp_column: String,
        time_unit: TimeUnit,
        zones: Vec<String>,
        window: TimeWindow,
    ) -> Self {
        Self {
            frame,
            timestamp_column,
            time_unit,
            zones,
            window,
        }
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Executes the plan and copies the window into memory.
    #[instrument(skip(self), fields(zones = ?self.zones, start = %self.window.start(), end = %self.window.end()))]
    pub fn materialize(self) -> Result<ResultSlice> {
        let started = Instant::now();
        let df = self.frame.collect()?;
        debug!(rows = df.height(), "Query collected");

        let timestamps = df
            .column(self.timestamp_column.as_str())?
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|raw| match raw {
                Some(raw) => from_epoch(raw, self.time_unit),
                None => Err(ComputeError::Timestamp(format!(
                    "null value in timestamp column '{}'",
                    self.timestamp_column
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = Vec::with_capacity(self.zones.len());
        for zone in &self.zones {
            let values: Vec<Option<f64>> = df
                .column(zone.as_str())?
                .as_materialized_series()
                .f64()?
                .into_iter()
                .collect();
            columns.push(ZoneSeries {
                zone: zone.clone(),
                values,
            });
        }

        info!(
            rows = timestamps.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Materialized demand slice"
        );
        Ok(ResultSlice::new(timestamps, columns))
    }
}

/// Values of one zone over the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSeries {
    pub zone: String,
    pub values: Vec<Option<f64>>,
}

/// In-memory, wide-format window of the dataset: shared timestamps and one
/// value column per zone, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSlice {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<ZoneSeries>,
}

impl ResultSlice {
    pub fn new(timestamps: Vec<DateTime<Utc>>, columns: Vec<ZoneSeries>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == timestamps.len()));
        Self {
            timestamps,
            columns,
        }
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[ZoneSeries] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [ZoneSeries] {
        &mut self.columns
    }

    pub fn column(&self, zone: &str) -> Option<&ZoneSeries> {
        self.columns.iter().find(|c| c.zone == zone)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DemandDataset;
    use crate::testing::{frame_from_columns, synthetic_frame};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_materialize_projects_and_filters() {
        let df = synthetic_frame(start(), 24 * 5, &["ES", "NL", "FR"]);
        let dataset = DemandDataset::from_lazy(df.clone().lazy(), None, "memory").unwrap();

        let window = TimeWindow::new(start() + Duration::days(1), 1);
        let query = dataset
            .plan(&["FR".to_string(), "ES".to_string()], &window)
            .unwrap();
        assert_eq!(query.zones(), &["FR", "ES"]);

        let slice = query.materialize().unwrap();
        // Inclusive on both ends: 24 hourly steps plus the closing sample.
        assert_eq!(slice.len(), 25);
        assert_eq!(slice.timestamps().first(), Some(&window.start()));
        assert_eq!(slice.timestamps().last(), Some(&window.end()));
        assert_eq!(slice.columns().len(), 2);
        assert_eq!(slice.columns()[0].zone, "FR");

        // Values line up with the source frame rows 24..=48.
        let es = df.column("ES").unwrap().as_materialized_series().f64().unwrap().clone();
        let expected: Vec<Option<f64>> = (24..=48).map(|i| es.get(i)).collect();
        assert_eq!(slice.column("ES").unwrap().values, expected);
    }

    #[test]
    fn test_window_outside_coverage_is_empty() {
        let df = synthetic_frame(start(), 24, &["ES"]);
        let dataset = DemandDataset::from_lazy(df.lazy(), None, "memory").unwrap();

        let window = TimeWindow::new(start() + Duration::days(30), 3);
        let slice = dataset
            .plan(&["ES".to_string()], &window)
            .unwrap()
            .materialize()
            .unwrap();

        assert!(slice.is_empty());
        assert_eq!(slice.columns().len(), 1);
        assert!(slice.columns()[0].values.is_empty());
    }

    #[test]
    fn test_unordered_rows_come_back_sorted() {
        let df = frame_from_columns(
            start(),
            Duration::hours(1),
            4,
            &[("ES", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])],
        );
        let reversed = df.reverse();
        let dataset = DemandDataset::from_lazy(reversed.lazy(), None, "memory").unwrap();

        let slice = dataset
            .plan(&["ES".to_string()], &TimeWindow::new(start(), 1))
            .unwrap()
            .materialize()
            .unwrap();

        assert!(slice.timestamps().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            slice.column("ES").unwrap().values,
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_nulls_survive_materialization() {
        let df = frame_from_columns(
            start(),
            Duration::hours(1),
            3,
            &[("NL", vec![Some(5.0), None, Some(6.0)])],
        );
        let dataset = DemandDataset::from_lazy(df.lazy(), None, "memory").unwrap();

        let slice = dataset
            .plan(&["NL".to_string()], &TimeWindow::new(start(), 1))
            .unwrap()
            .materialize()
            .unwrap();
        assert_eq!(slice.column("NL").unwrap().values, vec![Some(5.0), None, Some(6.0)]);
    }
}
