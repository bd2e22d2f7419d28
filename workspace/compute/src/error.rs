use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// One or more requested zones are not columns of the dataset
    #[error("Unknown zone(s): {}", .0.join(", "))]
    UnknownZone(Vec<String>),

    /// The dataset could not be opened or has an unusable schema
    #[error("Dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),

    /// Error from Polars Series operations
    #[error("Series error: {0}")]
    Series(String),

    /// A stored timestamp does not fit a UTC date time
    #[error("Timestamp error: {0}")]
    Timestamp(String),
}

impl ComputeError {
    /// Whether the error was caused by the caller's parameters rather than the data.
    pub fn is_user_error(&self) -> bool {
        matches!(self, ComputeError::UnknownZone(_))
    }
}

// Implement From<polars::error::PolarsError> for ComputeError
impl From<polars::error::PolarsError> for ComputeError {
    fn from(error: polars::error::PolarsError) -> Self {
        match error {
            polars::error::PolarsError::ColumnNotFound(_) => {
                let err = ComputeError::DataFrame(format!("Column not found: {}", error));
                error!(?err, "DataFrame error: Column not found");
                err
            }
            polars::error::PolarsError::IO { .. } => {
                let err = ComputeError::DatasetUnavailable(format!("I/O error: {}", error));
                error!(?err, "DataFrame error: I/O");
                err
            }
            polars::error::PolarsError::NoData(_) => {
                let err = ComputeError::DataFrame(format!("No data: {}", error));
                error!(?err, "DataFrame error: No data");
                err
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                let err = ComputeError::DataFrame(format!("Schema mismatch: {}", error));
                error!(?err, "DataFrame error: Schema mismatch");
                err
            }
            polars::error::PolarsError::ComputeError(_) => {
                let err = ComputeError::DataFrame(format!("Compute error: {}", error));
                error!(?err, "DataFrame error: Compute error");
                err
            }
            _ => {
                let err = ComputeError::Series(format!("Series error: {}", error));
                error!(?err, "Series error");
                err
            }
        }
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
