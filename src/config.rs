use anyhow::{Context, Result};
use clap::Args;
use compute::{open_pipeline, DatasetConfig};

use crate::schemas::AppState;

/// Dataset location flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Glob pattern matching the parquet partitions of the demand dataset
    #[arg(long = "data", env = "DEMAND_DATA", default_value = "data/load_gt60twh_2*.parquet")]
    pub pattern: String,

    /// Name of the UTC timestamp column (defaults to the first datetime column)
    #[arg(long, env = "DEMAND_TIMESTAMP_COLUMN")]
    pub timestamp_column: Option<String>,
}

impl DatasetArgs {
    pub fn dataset_config(&self) -> DatasetConfig {
        let config = DatasetConfig::new(self.pattern.clone());
        match &self.timestamp_column {
            Some(column) => config.with_timestamp_column(column.clone()),
            None => config,
        }
    }
}

/// Limits applied to chart queries.
#[derive(Args, Debug, Clone)]
pub struct QueryLimits {
    /// Seconds a single materialization may run before the request fails
    #[arg(long, env = "QUERY_TIMEOUT_SECS", default_value_t = 20)]
    pub query_timeout_secs: u64,

    /// Maximum number of chart queries materialized at the same time
    #[arg(long, env = "MAX_CONCURRENT_QUERIES", default_value_t = 4)]
    pub max_concurrent_queries: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            query_timeout_secs: 20,
            max_concurrent_queries: 4,
        }
    }
}

/// Load the dataset and build the application state.
///
/// Fails when the dataset cannot be opened, so the server never starts
/// without data.
pub fn initialize_app_state(dataset: &DatasetArgs, limits: &QueryLimits) -> Result<AppState> {
    tracing::info!("Loading demand dataset from {}", dataset.pattern);
    let pipeline = open_pipeline(&dataset.dataset_config())
        .with_context(|| format!("failed to load demand dataset '{}'", dataset.pattern))?;

    Ok(AppState::new(pipeline, limits))
}
