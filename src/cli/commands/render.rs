use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use common::{ChartMode, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use compute::{open_pipeline, ChartParams, DemandPipeline};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DatasetArgs;
use crate::helpers::figure::figure_html;
use crate::helpers::params::{parse_start, parse_zones};

/// File format written by `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Standalone plotly HTML page
    Html,
    /// Chart payload as served by `/api/v1/load/chart`
    Json,
}

/// Compute one chart from the dataset and write it to `output`.
pub fn render(
    dataset: &DatasetArgs,
    zones: &str,
    start: &str,
    days: i64,
    mode: &str,
    format: RenderFormat,
    output: &Path,
) -> Result<()> {
    let params = render_params(zones, start, days, mode)?;
    let pipeline = open_pipeline(&dataset.dataset_config())
        .with_context(|| format!("failed to load demand dataset '{}'", dataset.pattern))?;

    let document = render_document(&pipeline, &params, format)?;
    std::fs::write(output, document)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!("Chart written to {}", output.display());
    Ok(())
}

fn render_params(zones: &str, start: &str, days: i64, mode: &str) -> Result<ChartParams> {
    let start = parse_start(start).ok_or_else(|| {
        anyhow!("invalid start '{}', expected YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339", start)
    })?;
    if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&days) {
        bail!("days must be between {} and {}, got {}", MIN_WINDOW_DAYS, MAX_WINDOW_DAYS, days);
    }
    let mode: ChartMode = mode.parse()?;

    Ok(ChartParams::new(parse_zones(Some(zones)), start, days, mode))
}

fn render_document(pipeline: &DemandPipeline, params: &ChartParams, format: RenderFormat) -> Result<String> {
    debug!("Rendering {:?} chart for {:?}", format, params.zones);
    let chart = pipeline.compute_chart(params)?;
    for warning in &chart.warnings {
        warn!("{}", warning);
    }

    let document = match format {
        RenderFormat::Html => figure_html(&chart),
        RenderFormat::Json => serde_json::to_string_pretty(&chart)?,
    };
    Ok(document)
}
