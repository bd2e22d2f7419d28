use chrono::{DateTime, Utc};
use common::{ChartMode, ChartSeries, LoadChart};
use plotly::common::{Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};

/// Builds the plotly figure for a computed chart.
///
/// Line modes get one trace per zone; stacked mode gets one trace per zone
/// in a shared stack group so plotly draws the filled areas.
pub fn build_figure(chart: &LoadChart) -> Plot {
    let mut plot = Plot::new();

    match &chart.series {
        ChartSeries::Line { .. } => {
            for zone in &chart.zones {
                let (x, y): (Vec<DateTime<Utc>>, Vec<Option<f64>>) =
                    chart.zone_values(zone).into_iter().unzip();
                let trace = Scatter::new(x, y).mode(Mode::Lines).name(zone.as_str());
                plot.add_trace(trace);
            }
        }
        ChartSeries::Stacked { traces } => {
            for stacked in traces {
                let trace = Scatter::new(stacked.x.clone(), stacked.y.clone())
                    .mode(Mode::Lines)
                    .name(stacked.zone.as_str())
                    .stack_group("one");
                plot.add_trace(trace);
            }
        }
    }

    plot.set_layout(layout(chart));
    plot
}

fn layout(chart: &LoadChart) -> Layout {
    let y_title = if chart.mode.is_scaled() {
        "load (scaled)"
    } else {
        "load (MW)"
    };
    let title = format!(
        "Electricity demand, {} ({} to {})",
        chart.mode.label(),
        chart.window.start.format("%Y-%m-%d %H:%M"),
        chart.window.end.format("%Y-%m-%d %H:%M"),
    );

    let y_axis = Axis::new().title(Title::with_text(y_title));
    let y_axis = match chart.mode {
        ChartMode::ScaledRange | ChartMode::ScaledTotal => y_axis.range(vec![0.0, 1.05]),
        ChartMode::Raw | ChartMode::Stacked => y_axis,
    };

    Layout::new()
        .title(Title::with_text(title.as_str()))
        .x_axis(Axis::new().title(Title::with_text("time (UTC)")))
        .y_axis(y_axis)
}

/// Plotly figure as a JSON value (`data` and `layout`).
pub fn figure_json(chart: &LoadChart) -> serde_json::Result<serde_json::Value> {
    serde_json::from_str(&build_figure(chart).to_json())
}

/// Standalone HTML page rendering the figure.
pub fn figure_html(chart: &LoadChart) -> String {
    build_figure(chart).to_html()
}
