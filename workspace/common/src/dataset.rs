use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Description of the loaded demand dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DatasetSummary {
    /// Where the data was read from (glob pattern or a label for in-memory frames)
    pub source: String,
    /// Name of the timestamp column
    pub timestamp_column: String,
    /// Zone codes available for querying, in column order
    pub zones: Vec<String>,
    /// Earliest timestamp in the dataset, if any rows exist
    pub first_timestamp: Option<DateTime<Utc>>,
    /// Latest timestamp in the dataset, if any rows exist
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl DatasetSummary {
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
