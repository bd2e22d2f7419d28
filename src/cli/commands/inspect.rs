use anyhow::{Context, Result};
use compute::DemandDataset;
use tracing::{debug, info};

use crate::config::DatasetArgs;

/// Print the dataset summary (zones and coverage) as JSON on stdout.
pub fn inspect(dataset: &DatasetArgs) -> Result<()> {
    debug!("Inspecting dataset {}", dataset.pattern);
    let handle = DemandDataset::open(&dataset.dataset_config())
        .with_context(|| format!("failed to load demand dataset '{}'", dataset.pattern))?;

    let summary = handle.summary();
    info!(
        "Dataset has {} zones, timestamps in '{}'",
        summary.zone_count(),
        summary.timestamp_column
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
