//! Shaping an irregular reading history into a bounded, chart-ready series.
//!
//! The input is the already-fetched, time-ascending history for one
//! enclosure; the output is at most [`MAX_CHART_POINTS`] labeled points for
//! one metric. Shaping is pure: no clock reads, no storage access.

use chrono::{Local, Timelike};

use crate::model::{ChartSeries, Metric, Reading};

/// Upper bound on points in a rendered series.
pub const MAX_CHART_POINTS: usize = 24;

/// Shape a reading history into a series for one metric.
///
/// Readings missing the metric are dropped, not zero-filled. If nothing
/// remains the series is empty, which callers treat as "no data" rather than
/// an error. Histories longer than [`MAX_CHART_POINTS`] are decimated by a
/// fixed stride (`ceil(count / 24)`), keeping indices 0, stride, 2*stride, …
/// — intermediate points are discarded, never averaged, so the result
/// preserves actual measured values in their original order.
///
/// Values stay raw; rounding happens only at display time, not in the series
/// used for plotting axes.
pub fn shape(readings: &[Reading], metric: Metric) -> ChartSeries {
    let points: Vec<(&Reading, f64)> = readings
        .iter()
        .filter_map(|r| r.value_of(metric).map(|v| (r, v)))
        .collect();

    if points.is_empty() {
        return ChartSeries::empty();
    }

    let stride = points.len().div_ceil(MAX_CHART_POINTS);

    let mut labels = Vec::new();
    let mut values = Vec::new();

    for (reading, value) in points.iter().step_by(stride) {
        labels.push(point_label(&reading.timestamp.with_timezone(&Local)));
        values.push(*value);
    }

    ChartSeries { labels, values }
}

/// Axis label for one point: `hour:minute`, minutes zero-padded.
pub(crate) fn point_label<T: Timelike>(instant: &T) -> String {
    format!("{}:{:02}", instant.hour(), instant.minute())
}
