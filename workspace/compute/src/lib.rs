pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod reshape;
pub mod slice;
pub mod transform;
pub mod window;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;
use tracing::info;

pub use dataset::{DatasetConfig, DemandDataset};
pub use error::{ComputeError, Result};
pub use pipeline::{ChartParams, DemandPipeline};

/// Opens the dataset described by `config` and wraps it in a ready pipeline.
///
/// This is the one place the dataset gets loaded; callers share the returned
/// pipeline (it is cheap to clone) for the lifetime of the process.
pub fn open_pipeline(config: &DatasetConfig) -> Result<DemandPipeline> {
    let dataset = DemandDataset::open(config)?;
    info!(
        source = dataset.source(),
        zones = dataset.zones().len(),
        "Demand pipeline initialized"
    );
    Ok(DemandPipeline::new(Arc::new(dataset)))
}
