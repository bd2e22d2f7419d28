use chrono::{DateTime, Utc};
use common::{ChartMode, ChartSeries, LoadChart};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dataset::DemandDataset;
use crate::error::{ComputeError, Result};
use crate::reshape::{to_long, to_stacked};
use crate::slice::ResultSlice;
use crate::transform::apply_mode;
use crate::window::{clamp_days, TimeWindow};

/// Parameters of one chart request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartParams {
    /// Zone codes in display order, without duplicates.
    pub zones: Vec<String>,
    pub start: DateTime<Utc>,
    /// Window length in days, always within 1..=7.
    pub days: i64,
    pub mode: ChartMode,
}

impl ChartParams {
    /// Normalizes raw request values: zones are trimmed and de-duplicated
    /// (first occurrence wins), blank codes are dropped and `days` is clamped.
    pub fn new<I, S>(zones: I, start: DateTime<Utc>, days: i64, mode: ChartMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for zone in zones {
            let zone = zone.as_ref().trim();
            if !zone.is_empty() && !unique.iter().any(|z| z == zone) {
                unique.push(zone.to_string());
            }
        }

        Self {
            zones: unique,
            start,
            days: clamp_days(days),
            mode,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.days)
    }
}

/// Turns chart parameters into a chart using a shared, read-only dataset.
///
/// Every call recomputes from the dataset; the pipeline holds no per-request state.
#[derive(Debug, Clone)]
pub struct DemandPipeline {
    dataset: Arc<DemandDataset>,
}

impl DemandPipeline {
    pub fn new(dataset: Arc<DemandDataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &DemandDataset {
        &self.dataset
    }

    /// Fails with [`ComputeError::UnknownZone`] listing every zone the dataset lacks.
    pub fn validate_zones(&self, zones: &[String]) -> Result<()> {
        let unknown = self.dataset.unknown_zones(zones);
        if unknown.is_empty() {
            Ok(())
        } else {
            warn!(?unknown, "Rejecting request for unknown zones");
            Err(ComputeError::UnknownZone(unknown))
        }
    }

    /// Computes the demand chart for `params`.
    ///
    /// An empty zone list yields a chart without series and a window outside
    /// the data yields a chart without points; neither is an error.
    #[instrument(skip(self), fields(zones = ?params.zones, mode = %params.mode, days = params.days))]
    pub fn compute_chart(&self, params: &ChartParams) -> Result<LoadChart> {
        self.validate_zones(&params.zones)?;

        let window = params.window();
        debug!(start = %window.start(), end = %window.end(), "Resolved query window");

        let full_maxima = match params.mode {
            ChartMode::ScaledTotal => Some(self.dataset.column_maxima(&params.zones)?),
            ChartMode::Raw | ChartMode::ScaledRange | ChartMode::Stacked => None,
        };

        let mut slice = if params.zones.is_empty() {
            debug!("No zones requested, skipping the scan");
            ResultSlice::new(Vec::new(), Vec::new())
        } else {
            self.dataset.plan(&params.zones, &window)?.materialize()?
        };

        let warnings = apply_mode(&mut slice, params.mode, full_maxima.as_deref());

        let series = match params.mode {
            ChartMode::Raw | ChartMode::ScaledRange | ChartMode::ScaledTotal => {
                ChartSeries::Line {
                    points: to_long(&slice),
                }
            }
            ChartMode::Stacked => ChartSeries::Stacked {
                traces: to_stacked(&slice),
            },
        };

        info!(rows = slice.len(), warnings = warnings.len(), "Chart computed");

        Ok(LoadChart {
            mode: params.mode,
            zones: params.zones.clone(),
            window: window.into(),
            series,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frame_from_columns, frame_with_time_unit, synthetic_dataset, synthetic_frame};
    use crate::transform::series_maximum;
    use chrono::{Duration, TimeZone};
    use polars::prelude::{IntoLazy, TimeUnit};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn pipeline() -> DemandPipeline {
        DemandPipeline::new(Arc::new(synthetic_dataset(start(), 14, &["ES", "NL", "FR"])))
    }

    fn params(zones: &[&str], days: i64, mode: ChartMode) -> ChartParams {
        ChartParams::new(zones.iter().copied(), start(), days, mode)
    }

    #[test]
    fn test_params_normalization() {
        let p = ChartParams::new(["ES", " NL ", "ES", ""], start(), 0, ChartMode::Raw);
        assert_eq!(p.zones, vec!["ES", "NL"]);
        assert_eq!(p.days, 1);

        let p = ChartParams::new(Vec::<String>::new(), start(), 99, ChartMode::Raw);
        assert!(p.zones.is_empty());
        assert_eq!(p.days, 7);
    }

    #[test]
    fn test_raw_chart_for_two_zones_over_one_day() {
        let chart = pipeline()
            .compute_chart(&params(&["ES", "NL"], 1, ChartMode::Raw))
            .unwrap();

        assert_eq!(chart.series_count(), 2);
        assert_eq!(chart.zones, vec!["ES", "NL"]);
        assert_eq!(chart.window.start, start());
        assert_eq!(chart.window.end, start() + Duration::days(1));

        for zone in ["ES", "NL"] {
            let values = chart.zone_values(zone);
            assert_eq!(values.len(), 25);
            assert_eq!(values.first().unwrap().0, start());
            assert_eq!(values.last().unwrap().0, start() + Duration::days(1));
        }
    }

    #[test]
    fn test_raw_values_match_direct_slice() {
        let pipeline = pipeline();
        let p = params(&["FR", "ES"], 2, ChartMode::Raw);
        let chart = pipeline.compute_chart(&p).unwrap();

        let direct = pipeline
            .dataset()
            .plan(&p.zones, &p.window())
            .unwrap()
            .materialize()
            .unwrap();

        for column in direct.columns() {
            let values: Vec<_> = chart.zone_values(&column.zone).into_iter().map(|(_, v)| v).collect();
            let timestamps: Vec<_> = chart.zone_values(&column.zone).into_iter().map(|(t, _)| t).collect();
            assert_eq!(values, column.values);
            assert_eq!(timestamps, direct.timestamps());
        }
    }

    #[test]
    fn test_scaled_range_peaks_at_one_per_zone() {
        let chart = pipeline()
            .compute_chart(&params(&["ES", "NL"], 3, ChartMode::ScaledRange))
            .unwrap();

        for zone in ["ES", "NL"] {
            let values: Vec<_> = chart.zone_values(zone).into_iter().map(|(_, v)| v).collect();
            assert_eq!(series_maximum(&values), Some(1.0));
        }
        assert!(chart.warnings.is_empty());
    }

    #[test]
    fn test_scaled_total_stays_at_or_below_one() {
        let pipeline = pipeline();
        let chart = pipeline
            .compute_chart(&params(&["ES", "FR"], 2, ChartMode::ScaledTotal))
            .unwrap();

        for zone in ["ES", "FR"] {
            let values: Vec<_> = chart.zone_values(zone).into_iter().map(|(_, v)| v).collect();
            let peak = series_maximum(&values).unwrap();
            assert!(peak <= 1.0);
            // The synthetic load grows day over day, so the first days never reach the global peak.
            assert!(peak < 1.0);
        }

        let ranged = pipeline
            .compute_chart(&params(&["ES", "FR"], 2, ChartMode::ScaledRange))
            .unwrap();
        assert_ne!(chart.series, ranged.series);
    }

    #[test]
    fn test_stacked_traces_follow_request_order() {
        let chart = pipeline()
            .compute_chart(&params(&["NL", "ES"], 1, ChartMode::Stacked))
            .unwrap();

        let ChartSeries::Stacked { traces } = &chart.series else {
            panic!("expected stacked series");
        };
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].zone, "NL");
        assert_eq!(traces[1].zone, "ES");
        assert_eq!(traces[1].baseline, traces[0].cumulative);

        let first: Vec<f64> = traces[0].y.iter().map(|v| v.unwrap()).collect();
        assert_eq!(traces[1].baseline, first);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let pipeline = pipeline();
        for mode in ChartMode::ALL {
            let p = params(&["ES", "NL"], 2, mode);
            let first = pipeline.compute_chart(&p).unwrap();
            let second = pipeline.compute_chart(&p).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_empty_zones_yield_empty_chart() {
        for mode in ChartMode::ALL {
            let chart = pipeline().compute_chart(&params(&[], 1, mode)).unwrap();
            assert_eq!(chart.series_count(), 0);
            assert!(chart.is_empty());
        }
    }

    #[test]
    fn test_window_outside_data_yields_empty_chart() {
        let p = ChartParams::new(["ES"], start() + Duration::days(365), 7, ChartMode::ScaledRange);
        let chart = pipeline().compute_chart(&p).unwrap();
        assert!(chart.is_empty());
        assert!(chart.warnings.is_empty());
    }

    #[test]
    fn test_unknown_zone_is_reported() {
        let err = pipeline()
            .compute_chart(&params(&["ES", "XX"], 1, ChartMode::Raw))
            .unwrap_err();

        assert!(err.is_user_error());
        match err {
            ComputeError::UnknownZone(zones) => assert_eq!(zones, vec!["XX"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_maximum_is_flagged_not_fatal() {
        let df = frame_from_columns(
            start(),
            Duration::hours(1),
            3,
            &[
                ("ES", vec![Some(4.0), Some(2.0), Some(8.0)]),
                ("NO", vec![Some(0.0), Some(0.0), Some(0.0)]),
            ],
        );
        let dataset = DemandDataset::from_lazy(df.lazy(), None, "memory").unwrap();
        let pipeline = DemandPipeline::new(Arc::new(dataset));

        for mode in [ChartMode::ScaledRange, ChartMode::ScaledTotal] {
            let chart = pipeline.compute_chart(&params(&["ES", "NO"], 1, mode)).unwrap();
            let no: Vec<_> = chart.zone_values("NO").into_iter().map(|(_, v)| v).collect();
            assert_eq!(no, vec![Some(0.0); 3]);
            assert_eq!(chart.warnings.len(), 1);
            assert!(chart.warnings[0].contains("zone NO"));
        }
    }

    #[test]
    fn test_pipeline_over_partial_frame() {
        // Only the first few hours exist; the rest of the window is simply absent.
        let df = synthetic_frame(start(), 5, &["ES"]);
        let dataset = DemandDataset::from_lazy(df.lazy(), None, "memory").unwrap();
        let chart = DemandPipeline::new(Arc::new(dataset))
            .compute_chart(&params(&["ES"], 7, ChartMode::Raw))
            .unwrap();
        assert_eq!(chart.zone_values("ES").len(), 5);
    }

    #[test]
    fn test_nanosecond_dataset_outside_storage_range_is_empty() {
        let df = frame_with_time_unit(
            TimeUnit::Nanoseconds,
            start(),
            Duration::hours(1),
            48,
            &[("ES", (0..48).map(|h| Some(h as f64)).collect())],
        );
        let dataset = DemandDataset::from_lazy(df.lazy(), None, "memory").unwrap();
        assert_eq!(dataset.time_unit(), TimeUnit::Nanoseconds);
        let pipeline = DemandPipeline::new(Arc::new(dataset));

        let inside = pipeline
            .compute_chart(&ChartParams::new(["ES"], start(), 1, ChartMode::Raw))
            .unwrap();
        assert_eq!(inside.zone_values("ES").len(), 25);

        for year in [2300, 1600] {
            let far = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
            for mode in ChartMode::ALL {
                let chart = pipeline
                    .compute_chart(&ChartParams::new(["ES"], far, 1, mode))
                    .unwrap();
                assert!(chart.is_empty(), "{year} {mode} should be empty");
                assert!(chart.warnings.is_empty());
            }
        }
    }

    #[test]
    fn test_window_at_max_instant_is_empty() {
        let far = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let chart = pipeline()
            .compute_chart(&ChartParams::new(["ES"], far, 7, ChartMode::Raw))
            .unwrap();
        assert!(chart.is_empty());
        assert_eq!(chart.window.end, DateTime::<Utc>::MAX_UTC);
    }
}
