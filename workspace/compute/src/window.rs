use chrono::{DateTime, Duration, Utc};
use common::{ChartWindow, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use polars::prelude::TimeUnit;
use tracing::warn;

use crate::error::{ComputeError, Result};

/// Clamps a requested day count into the supported window length.
pub fn clamp_days(days: i64) -> i64 {
    let clamped = days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS);
    if clamped != days {
        warn!(requested = days, clamped, "Window length out of range, clamping");
    }
    clamped
}

/// Time window `[start, start + days]`, inclusive on both ends.
///
/// Hourly data over a one day window therefore yields 25 samples: the window
/// keeps the sample sitting exactly on the end boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    days: i64,
}

impl TimeWindow {
    /// Creates a window of `days` 24 hour steps after `start`. `days` is clamped to 1..=7.
    ///
    /// An end past the last representable instant saturates to it.
    pub fn new(start: DateTime<Utc>, days: i64) -> Self {
        let days = clamp_days(days);
        let end = start
            .checked_add_signed(Duration::days(days))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end, days }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Window bounds expressed as raw integers in the storage time unit.
    pub fn bounds_in(&self, unit: TimeUnit) -> (i64, i64) {
        (to_epoch(self.start, unit), to_epoch(self.end, unit))
    }
}

impl From<TimeWindow> for ChartWindow {
    fn from(window: TimeWindow) -> Self {
        ChartWindow {
            start: window.start,
            end: window.end,
        }
    }
}

/// Converts a UTC date time to an epoch offset in the given unit.
///
/// Instants the unit cannot represent saturate to `i64::MIN` or `i64::MAX`,
/// which still orders them correctly against every stored value.
pub fn to_epoch(ts: DateTime<Utc>, unit: TimeUnit) -> i64 {
    let (per_second, subsec) = match unit {
        TimeUnit::Nanoseconds => (1_000_000_000, ts.timestamp_subsec_nanos() as i64),
        TimeUnit::Microseconds => (1_000_000, ts.timestamp_subsec_micros() as i64),
        TimeUnit::Milliseconds => (1_000, ts.timestamp_subsec_millis() as i64),
    };
    let seconds = ts.timestamp();
    seconds
        .checked_mul(per_second)
        .and_then(|v| v.checked_add(subsec))
        .unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX })
}

/// Converts an epoch offset in the given unit back to a UTC date time.
pub fn from_epoch(value: i64, unit: TimeUnit) -> Result<DateTime<Utc>> {
    let ts = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    ts.ok_or_else(|| ComputeError::Timestamp(format!("{} {:?} is out of range", value, unit)))
}
