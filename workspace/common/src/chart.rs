use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Display and normalization strategy applied to the windowed series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ChartMode {
    /// Values exactly as stored.
    #[default]
    Raw,
    /// Each zone divided by its own maximum inside the window.
    #[serde(alias = "scaled_range", alias = "scaled (range)")]
    ScaledRange,
    /// Each zone divided by its maximum over the whole dataset.
    #[serde(alias = "scaled_total", alias = "scaled (total)")]
    ScaledTotal,
    /// Unscaled values rendered as cumulative areas.
    Stacked,
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [
        ChartMode::Raw,
        ChartMode::ScaledRange,
        ChartMode::ScaledTotal,
        ChartMode::Stacked,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Raw => "raw",
            ChartMode::ScaledRange => "scaled-range",
            ChartMode::ScaledTotal => "scaled-total",
            ChartMode::Stacked => "stacked",
        }
    }

    /// Human readable label, as shown in the plot type picker.
    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::Raw => "raw",
            ChartMode::ScaledRange => "scaled (range)",
            ChartMode::ScaledTotal => "scaled (total)",
            ChartMode::Stacked => "stacked",
        }
    }

    pub fn is_scaled(&self) -> bool {
        matches!(self, ChartMode::ScaledRange | ChartMode::ScaledTotal)
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string matches none of the known chart modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChartModeError(pub String);

impl fmt::Display for ParseChartModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown chart mode '{}', expected one of: raw, scaled-range, scaled-total, stacked",
            self.0
        )
    }
}

impl std::error::Error for ParseChartModeError {}

impl FromStr for ChartMode {
    type Err = ParseChartModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ChartMode::Raw),
            "scaled-range" | "scaled_range" | "scaled (range)" => Ok(ChartMode::ScaledRange),
            "scaled-total" | "scaled_total" | "scaled (total)" => Ok(ChartMode::ScaledTotal),
            "stacked" => Ok(ChartMode::Stacked),
            _ => Err(ParseChartModeError(s.to_string())),
        }
    }
}

/// Closed time window `[start, end]`, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChartWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One observation of the long-format table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoadPoint {
    pub timestamp: DateTime<Utc>,
    pub zone: String,
    /// Missing readings are `null`.
    pub value: Option<f64>,
}

/// One cumulative area of a stacked chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StackedTrace {
    pub zone: String,
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<Option<f64>>,
    /// Bottom edge of the area: sum of every trace stacked before this one.
    pub baseline: Vec<f64>,
    /// Top edge of the area: `baseline + y`, missing readings count as zero.
    pub cumulative: Vec<f64>,
}

/// Chart payload, either long format for line rendering or stacked traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSeries {
    Line { points: Vec<LoadPoint> },
    Stacked { traces: Vec<StackedTrace> },
}

/// Rendered demand chart for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoadChart {
    pub mode: ChartMode,
    /// Zones in the order they were requested.
    pub zones: Vec<String>,
    pub window: ChartWindow,
    pub series: ChartSeries,
    /// Non-fatal issues, such as a zone whose scaling maximum was zero.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl LoadChart {
    /// Number of distinct series (line modes) or traces (stacked mode).
    pub fn series_count(&self) -> usize {
        match &self.series {
            ChartSeries::Line { points } => {
                let mut seen: Vec<&str> = Vec::new();
                for point in points {
                    if !seen.contains(&point.zone.as_str()) {
                        seen.push(point.zone.as_str());
                    }
                }
                seen.len()
            }
            ChartSeries::Stacked { traces } => traces.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.series {
            ChartSeries::Line { points } => points.is_empty(),
            ChartSeries::Stacked { traces } => traces.iter().all(|t| t.x.is_empty()),
        }
    }

    /// Timestamps and values for one zone, in time order.
    pub fn zone_values(&self, zone: &str) -> Vec<(DateTime<Utc>, Option<f64>)> {
        match &self.series {
            ChartSeries::Line { points } => points
                .iter()
                .filter(|p| p.zone == zone)
                .map(|p| (p.timestamp, p.value))
                .collect(),
            ChartSeries::Stacked { traces } => traces
                .iter()
                .find(|t| t.zone == zone)
                .map(|t| t.x.iter().copied().zip(t.y.iter().copied()).collect())
                .unwrap_or_default(),
        }
    }
}
