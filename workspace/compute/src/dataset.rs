//! Read-only handle over the partitioned demand dataset.
//!
//! The dataset is a lazily scanned table with one datetime column and one
//! numeric column per zone. It is opened once at startup and shared by every
//! query; nothing in this module mutates it after construction.

use chrono::{DateTime, Utc};
use common::DatasetSummary;
use polars::prelude::*;
use std::fmt;
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::slice::LoadQuery;
use crate::window::{from_epoch, TimeWindow};

/// Where to find the dataset and how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Glob pattern matching the parquet partitions, e.g. `data/load_gt60twh_2*.parquet`
    pub pattern: String,
    /// Name of the timestamp column. The first datetime column is used when unset.
    pub timestamp_column: Option<String>,
}

impl DatasetConfig {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            timestamp_column: None,
        }
    }

    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = Some(column.into());
        self
    }
}

/// Immutable demand dataset: one timestamp index and one column per zone.
pub struct DemandDataset {
    frame: LazyFrame,
    source: String,
    timestamp_column: String,
    time_unit: TimeUnit,
    zones: Vec<String>,
    first_timestamp: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl DemandDataset {
    /// Scans the parquet partitions matched by `config.pattern`.
    ///
    /// Every failure, from a missing file to a schema without a datetime
    /// column, is reported as [`ComputeError::DatasetUnavailable`].
    #[instrument(skip(config), fields(pattern = %config.pattern))]
    pub fn open(config: &DatasetConfig) -> Result<Self> {
        info!("Opening demand dataset");
        let frame = LazyFrame::scan_parquet(config.pattern.as_str(), ScanArgsParquet::default())
            .map_err(|e| {
                ComputeError::DatasetUnavailable(format!(
                    "cannot scan '{}': {}",
                    config.pattern, e
                ))
            })?;

        Self::from_lazy(frame, config.timestamp_column.as_deref(), config.pattern.as_str()).map_err(
            |e| match e {
                ComputeError::DatasetUnavailable(_) => e,
                other => ComputeError::DatasetUnavailable(format!(
                    "cannot read '{}': {}",
                    config.pattern, other
                )),
            },
        )
    }

    /// Builds the handle over any lazy frame.
    pub fn from_lazy(
        frame: LazyFrame,
        timestamp_column: Option<&str>,
        source: impl Into<String>,
    ) -> Result<Self> {
        let source = source.into();
        let schema = frame.clone().collect_schema()?;

        let (timestamp_column, time_unit) = match timestamp_column {
            Some(name) => match schema.get(name) {
                Some(DataType::Datetime(unit, _)) => (name.to_string(), *unit),
                Some(other) => {
                    return Err(ComputeError::DatasetUnavailable(format!(
                        "timestamp column '{}' has type {}, expected a datetime",
                        name, other
                    )));
                }
                None => {
                    return Err(ComputeError::DatasetUnavailable(format!(
                        "timestamp column '{}' not found in {}",
                        name, source
                    )));
                }
            },
            None => schema
                .iter()
                .find_map(|(name, dtype)| match dtype {
                    DataType::Datetime(unit, _) => Some((name.to_string(), *unit)),
                    _ => None,
                })
                .ok_or_else(|| {
                    ComputeError::DatasetUnavailable(format!("no datetime column in {}", source))
                })?,
        };

        let zones: Vec<String> = schema
            .iter()
            .filter(|(name, dtype)| name.as_str() != timestamp_column && is_demand_dtype(dtype))
            .map(|(name, _)| name.to_string())
            .collect();

        if zones.is_empty() {
            return Err(ComputeError::DatasetUnavailable(format!(
                "no numeric zone columns in {}",
                source
            )));
        }

        let raw = col(timestamp_column.as_str()).cast(DataType::Int64);
        let bounds = frame
            .clone()
            .select([raw.clone().min().alias("first"), raw.max().alias("last")])
            .collect()?;
        let first = bounds.column("first")?.as_materialized_series().i64()?.get(0);
        let last = bounds.column("last")?.as_materialized_series().i64()?.get(0);
        let first_timestamp = first.map(|v| from_epoch(v, time_unit)).transpose()?;
        let last_timestamp = last.map(|v| from_epoch(v, time_unit)).transpose()?;

        info!(
            zones = zones.len(),
            timestamp_column = %timestamp_column,
            first = ?first_timestamp,
            last = ?last_timestamp,
            "Demand dataset ready"
        );

        Ok(Self {
            frame,
            source,
            timestamp_column,
            time_unit,
            zones,
            first_timestamp,
            last_timestamp,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Zone codes in column order.
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z == zone)
    }

    /// Returns the requested zones that are not columns of the dataset.
    pub fn unknown_zones(&self, zones: &[String]) -> Vec<String> {
        zones.iter().filter(|z| !self.has_zone(z)).cloned().collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            source: self.source.clone(),
            timestamp_column: self.timestamp_column.clone(),
            zones: self.zones.clone(),
            first_timestamp: self.first_timestamp,
            last_timestamp: self.last_timestamp,
        }
    }

    /// Maximum of each zone over the whole column, ignoring any time window.
    ///
    /// `None` means the column holds no non-null value.
    #[instrument(skip(self))]
    pub fn column_maxima(&self, zones: &[String]) -> Result<Vec<Option<f64>>> {
        if zones.is_empty() {
            return Ok(Vec::new());
        }

        let exprs: Vec<Expr> = zones
            .iter()
            .map(|z| col(z.as_str()).cast(DataType::Float64).max())
            .collect();
        let df = self.frame.clone().select(exprs).collect()?;

        let maxima = zones
            .iter()
            .map(|z| -> Result<Option<f64>> {
                Ok(df.column(z.as_str())?.as_materialized_series().f64()?.get(0))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(?maxima, "Computed full-column maxima");
        Ok(maxima)
    }

    /// Builds the logical query for `zones` over `window` without executing it.
    pub fn plan(&self, zones: &[String], window: &TimeWindow) -> Result<LoadQuery> {
        let (lo, hi) = window.bounds_in(self.time_unit);

        let ts = col(self.timestamp_column.as_str());
        let mut projection = Vec::with_capacity(zones.len() + 1);
        projection.push(ts.clone());
        projection.extend(zones.iter().map(|z| col(z.as_str()).cast(DataType::Float64)));

        let raw = ts.clone().cast(DataType::Int64);
        let frame = self
            .frame
            .clone()
            .select(projection)
            .filter(raw.clone().gt_eq(lit(lo)).and(raw.lt_eq(lit(hi))))
            .sort_by_exprs(vec![ts], SortMultipleOptions::default());

        Ok(LoadQuery::new(
            frame,
            self.timestamp_column.clone(),
            self.time_unit,
            zones.to_vec(),
            *window,
        ))
    }
}

impl fmt::Debug for DemandDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemandDataset")
            .field("source", &self.source)
            .field("timestamp_column", &self.timestamp_column)
            .field("time_unit", &self.time_unit)
            .field("zones", &self.zones)
            .field("first_timestamp", &self.first_timestamp)
            .field("last_timestamp", &self.last_timestamp)
            .finish()
    }
}

fn is_demand_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}
