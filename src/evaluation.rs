//! Condition classification: comparing a raw reading against the applicable
//! species band and deriving a severity tier.
//!
//! All functions here are pure and synchronous over already-fetched inputs.
//! The period is an explicit argument, never read from the system clock, so
//! every path is deterministic under test.

use crate::model::{Evaluation, Metric, Period, Severity};
use crate::species::{ConditionRange, SpeciesProfile};

/// Deviations up to this fraction of the band width count as slight.
pub const SLIGHT_DEVIATION_THRESHOLD: f64 = 0.15;

/// Intended upper bound of the severe tier. Currently inert: the comparison
/// below resolves everything past `SLIGHT_DEVIATION_THRESHOLD` to severe, so
/// the branch on this constant never produces a distinct outcome. Kept so the
/// tuning values stay visible in one place.
// TODO: decide whether readings past this bound warrant a separate critical
// tier; until then both branches classify as severe.
pub const SEVERE_DEVIATION_THRESHOLD: f64 = 0.30;

/// Classify one metric of one reading against a species profile.
///
/// Degrades to [`Evaluation::unknown`] when either the value or the profile
/// is absent; absence of information is never an error here.
///
/// Band selection:
/// - humidity and air temperature use the band for the resolved period;
/// - surface temperature uses the basking band whenever the species has one,
///   regardless of period, and falls back to the period's air band otherwise.
pub fn classify(
    value: Option<f64>,
    profile: Option<&SpeciesProfile>,
    metric: Metric,
    period: Period,
) -> Evaluation {
    let (Some(value), Some(profile)) = (value, profile) else {
        return Evaluation::unknown();
    };

    let range = select_range(profile, metric, period);
    let severity = severity_of(value, range);

    Evaluation {
        value: metric.format(value),
        severity,
        color: severity.color(),
    }
}

/// The band applicable to a metric under a period.
pub fn select_range(profile: &SpeciesProfile, metric: Metric, period: Period) -> &ConditionRange {
    match metric {
        Metric::Humidity => profile.humidity.for_period(period),
        Metric::AirTemperature => profile.temperature.for_period(period),
        Metric::SurfaceTemperature => profile
            .temperature
            .basking
            .as_ref()
            .unwrap_or_else(|| profile.temperature.for_period(period)),
    }
}

/// Severity of a value against one band.
///
/// Out-of-band values are measured as a normalized deviation: distance to the
/// nearest bound divided by the band width. A zero-width band tolerates only
/// exact equality; anything else is severe, and the ratio is never computed.
pub fn severity_of(value: f64, range: &ConditionRange) -> Severity {
    if value >= range.min && value <= range.max {
        return Severity::Optimal;
    }

    let span = range.span();
    if span == 0.0 {
        return Severity::SevereDeviation;
    }

    let deviation = if value < range.min {
        (range.min - value) / span
    } else {
        (value - range.max) / span
    };

    if deviation <= SLIGHT_DEVIATION_THRESHOLD {
        Severity::SlightDeviation
    } else {
        // Both sides of SEVERE_DEVIATION_THRESHOLD land here; see the note
        // on that constant.
        Severity::SevereDeviation
    }
}
