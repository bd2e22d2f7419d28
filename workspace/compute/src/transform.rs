use common::ChartMode;
use tracing::{debug, warn};

use crate::slice::ResultSlice;

/// Largest non-null, non-NaN value.
pub fn series_maximum(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some(max) if max >= v => Some(max),
            _ => Some(v),
        })
}

/// Divides every value by `maximum`.
///
/// A zero or missing maximum cannot scale anything; every present value is set
/// to `0.0` instead and `false` is returned so the caller can flag the zone.
pub fn scale_by(values: &mut [Option<f64>], maximum: Option<f64>) -> bool {
    match maximum {
        Some(max) if max != 0.0 && max.is_finite() => {
            for value in values.iter_mut().flatten() {
                *value /= max;
            }
            true
        }
        _ => {
            for value in values.iter_mut().flatten() {
                *value = 0.0;
            }
            false
        }
    }
}

/// Applies the normalization of `mode` in place and returns any warnings.
///
/// `full_maxima` holds one entry per slice column and is only read for
/// [`ChartMode::ScaledTotal`].
pub fn apply_mode(
    slice: &mut ResultSlice,
    mode: ChartMode,
    full_maxima: Option<&[Option<f64>]>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    match mode {
        ChartMode::Raw | ChartMode::Stacked => {}
        ChartMode::ScaledRange => {
            for column in slice.columns_mut() {
                let maximum = series_maximum(&column.values);
                debug!(zone = %column.zone, ?maximum, "Scaling by window maximum");
                if !scale_by(&mut column.values, maximum) && !column.values.is_empty() {
                    warnings.push(zero_maximum_warning(&column.zone, "window"));
                }
            }
        }
        ChartMode::ScaledTotal => {
            let maxima = full_maxima.unwrap_or(&[]);
            for (i, column) in slice.columns_mut().iter_mut().enumerate() {
                let maximum = maxima.get(i).copied().flatten();
                debug!(zone = %column.zone, ?maximum, "Scaling by full-column maximum");
                if !scale_by(&mut column.values, maximum) && !column.values.is_empty() {
                    warnings.push(zero_maximum_warning(&column.zone, "dataset"));
                }
            }
        }
    }

    for message in &warnings {
        warn!("{}", message);
    }
    warnings
}

fn zero_maximum_warning(zone: &str, scope: &str) -> String {
    format!(
        "zone {} has a zero or missing {} maximum, scaled values are shown as 0",
        zone, scope
    )
}
