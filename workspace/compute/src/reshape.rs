use common::{LoadPoint, StackedTrace};

use crate::slice::ResultSlice;

/// Pivots the wide slice into long format, grouped by zone then time.
pub fn to_long(slice: &ResultSlice) -> Vec<LoadPoint> {
    let mut points = Vec::with_capacity(slice.len() * slice.columns().len());
    for column in slice.columns() {
        points.extend(
            slice
                .timestamps()
                .iter()
                .zip(&column.values)
                .map(|(ts, value)| LoadPoint {
                    timestamp: *ts,
                    zone: column.zone.clone(),
                    value: *value,
                }),
        );
    }
    points
}

/// Builds one cumulative area per zone, stacked in column order.
///
/// Missing readings contribute nothing to the stack, the same way plotly
/// fills gaps in a stack group.
pub fn to_stacked(slice: &ResultSlice) -> Vec<StackedTrace> {
    let mut running = vec![0.0; slice.len()];
    let mut traces = Vec::with_capacity(slice.columns().len());

    for column in slice.columns() {
        let baseline = running.clone();
        for (total, value) in running.iter_mut().zip(&column.values) {
            *total += value.unwrap_or(0.0);
        }
        traces.push(StackedTrace {
            zone: column.zone.clone(),
            x: slice.timestamps().to_vec(),
            y: column.values.clone(),
            baseline,
            cumulative: running.clone(),
        });
    }
    traces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::ZoneSeries;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn slice() -> ResultSlice {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        ResultSlice::new(
            (0..3).map(|h| start + Duration::hours(h)).collect(),
            vec![
                ZoneSeries {
                    zone: "ES".into(),
                    values: vec![Some(10.0), Some(20.0), Some(30.0)],
                },
                ZoneSeries {
                    zone: "NL".into(),
                    values: vec![Some(1.0), None, Some(3.0)],
                },
            ],
        )
    }

    #[test]
    fn test_long_format_rebuilds_the_wide_slice() {
        let slice = slice();
        let points = to_long(&slice);
        assert_eq!(points.len(), 6);

        let mut wide: BTreeMap<String, Vec<(DateTime<Utc>, Option<f64>)>> = BTreeMap::new();
        for point in &points {
            wide.entry(point.zone.clone())
                .or_default()
                .push((point.timestamp, point.value));
        }

        for column in slice.columns() {
            let rebuilt = &wide[&column.zone];
            let timestamps: Vec<_> = rebuilt.iter().map(|(ts, _)| *ts).collect();
            let values: Vec<_> = rebuilt.iter().map(|(_, v)| *v).collect();
            assert_eq!(timestamps, slice.timestamps());
            assert_eq!(values, column.values);
        }
    }

    #[test]
    fn test_long_format_keeps_zone_order() {
        let points = to_long(&slice());
        assert!(points[..3].iter().all(|p| p.zone == "ES"));
        assert!(points[3..].iter().all(|p| p.zone == "NL"));
    }

    #[test]
    fn test_stacked_baseline_is_previous_cumulative() {
        let traces = to_stacked(&slice());
        assert_eq!(traces.len(), 2);

        assert_eq!(traces[0].zone, "ES");
        assert_eq!(traces[0].baseline, vec![0.0, 0.0, 0.0]);
        assert_eq!(traces[0].cumulative, vec![10.0, 20.0, 30.0]);

        assert_eq!(traces[1].zone, "NL");
        assert_eq!(traces[1].baseline, traces[0].cumulative);
        assert_eq!(traces[1].cumulative, vec![11.0, 20.0, 33.0]);
        assert_eq!(traces[1].y, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_empty_slice_reshapes_to_empty_series() {
        let slice = ResultSlice::new(
            vec![],
            vec![ZoneSeries {
                zone: "ES".into(),
                values: vec![],
            }],
        );
        assert!(to_long(&slice).is_empty());

        let traces = to_stacked(&slice);
        assert_eq!(traces.len(), 1);
        assert!(traces[0].x.is_empty());
    }
}
