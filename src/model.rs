//! Data models for Vivarium.
//!
//! The vocabulary here is deliberately small: raw sensor [`Reading`]s flow in,
//! get compared against a species' acceptable bands, and come out as
//! [`Evaluation`]s (a display value, a [`Severity`] tier, and a color token)
//! or as a chart-ready [`ChartSeries`]. Everything derived is recomputed on
//! every read; nothing in this module is persisted except [`Reading`] and
//! [`Enclosure`], which are owned by the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single sensor reading for an enclosure.
///
/// Any subset of the three metrics may be present. An absent metric means the
/// sensor produced no data, which is semantically distinct from zero and is
/// never zero-filled downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,

    /// The enclosure this reading was taken in.
    pub enclosure_id: i64,

    /// When the reading was taken (UTC).
    pub timestamp: DateTime<Utc>,

    /// Relative humidity in percent.
    pub humidity: Option<f64>,

    /// Ambient air temperature in degrees Celsius.
    pub air_temperature: Option<f64>,

    /// Surface (basking spot) temperature in degrees Celsius.
    pub surface_temperature: Option<f64>,
}

impl Reading {
    /// The value of one metric on this reading, if the sensor reported it.
    pub fn value_of(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Humidity => self.humidity,
            Metric::AirTemperature => self.air_temperature,
            Metric::SurfaceTemperature => self.surface_temperature,
        }
    }
}

/// A monitored habitat.
///
/// An enclosure without an assigned species has no evaluable ranges;
/// evaluation degrades to [`Severity::Unknown`] rather than failing.
#[derive(Debug, Clone, Serialize)]
pub struct Enclosure {
    pub id: i64,

    /// Display name, e.g. "Terrarium 3".
    pub name: String,

    /// Species housed here; must match a catalog key to be evaluable.
    pub species: Option<String>,

    pub description: Option<String>,

    /// When the enclosure was registered (UTC).
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /enclosures.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEnclosure {
    pub name: String,

    #[serde(default)]
    pub species: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for POST /readings.
///
/// The timestamp is optional: sensors that batch and backfill supply their
/// own, everything else gets a server-assigned one.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingRequest {
    pub enclosure_id: i64,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub humidity: Option<f64>,

    #[serde(default)]
    pub air_temperature: Option<f64>,

    #[serde(default)]
    pub surface_temperature: Option<f64>,
}

impl ReadingRequest {
    /// Resolve the request into a persistable reading, assigning `now` when
    /// the sensor supplied no timestamp of its own.
    pub fn into_new_reading(self, now: DateTime<Utc>) -> NewReading {
        NewReading {
            enclosure_id: self.enclosure_id,
            timestamp: self.timestamp.unwrap_or(now),
            humidity: self.humidity,
            air_temperature: self.air_temperature,
            surface_temperature: self.surface_temperature,
        }
    }
}

/// A reading ready to persist: timestamp already resolved, id not yet
/// assigned.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub enclosure_id: i64,
    pub timestamp: DateTime<Utc>,
    pub humidity: Option<f64>,
    pub air_temperature: Option<f64>,
    pub surface_temperature: Option<f64>,
}

/// One of the three monitored environmental metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Humidity,
    AirTemperature,
    SurfaceTemperature,
}

impl Metric {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Humidity => "Humidity",
            Metric::AirTemperature => "Air Temperature",
            Metric::SurfaceTemperature => "Surface Temperature",
        }
    }

    /// Render a raw value for display: one decimal place, with the unit
    /// marker for this metric.
    pub fn format(&self, value: f64) -> String {
        match self {
            Metric::Humidity => format!("{value:.1}%"),
            Metric::AirTemperature | Metric::SurfaceTemperature => format!("{value:.1}°C"),
        }
    }
}

/// How far a reading sits from its acceptable band.
///
/// Ordered by distance from the band: `Optimal < SlightDeviation <
/// SevereDeviation`. `Unknown` sits outside the ordering entirely; it marks
/// absence of information (no reading, no profile), not a measured extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Inside the acceptable band.
    Optimal,

    /// Outside the band by at most 15% of the band's width.
    SlightDeviation,

    /// Outside the band by more than 15% of the band's width.
    SevereDeviation,

    /// No reading, no profile, or no range to compare against.
    Unknown,
}

impl Severity {
    /// The fixed color token for this tier, shared with the presentation
    /// layer. Total over the enum.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Optimal => "#4ade80",
            Severity::SlightDeviation => "#fb923c",
            Severity::SevereDeviation => "#ef4444",
            Severity::Unknown => "#a1a1aa",
        }
    }
}

/// The outcome of classifying one metric of one reading.
///
/// Derived, never persisted; recomputed on every read.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Display-ready value, e.g. "27.3°C", or "N/A" when unknown.
    pub value: String,

    pub severity: Severity,

    /// Color token matching the severity.
    pub color: &'static str,
}

impl Evaluation {
    /// The degraded result used whenever there is nothing to evaluate.
    pub fn unknown() -> Self {
        Self {
            value: "N/A".to_string(),
            severity: Severity::Unknown,
            color: Severity::Unknown.color(),
        }
    }
}

/// Whether day or night thresholds apply.
///
/// Resolved purely from the local hour-of-day; callers pass the instant in
/// explicitly so evaluation never reads the system clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Night,
}

impl Period {
    /// Resolve the period for an instant, using its local hour-of-day.
    pub fn of<T: Timelike>(instant: &T) -> Self {
        Self::from_hour(instant.hour())
    }

    /// Night runs from 19:00 (inclusive) to 07:00 (exclusive).
    pub fn from_hour(hour: u32) -> Self {
        if hour < 7 || hour >= 19 {
            Period::Night
        } else {
            Period::Day
        }
    }
}

/// A relative time window bounding a reading history query.
///
/// A closed enumeration: any other keyword is a caller error, rejected at
/// parse time rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24Hours,

    #[serde(rename = "7d")]
    Last7Days,

    #[serde(rename = "30d")]
    Last30Days,
}

impl TimeRange {
    /// The lower bound of this window relative to `now`, as an exact instant.
    ///
    /// The reading store returns rows with `timestamp >= start_from(now)`,
    /// ascending.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Last24Hours => now - Duration::hours(24),
            TimeRange::Last7Days => now - Duration::days(7),
            TimeRange::Last30Days => now - Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a window keyword outside the supported set.
#[derive(Debug, Error)]
#[error("unsupported time range {0:?} (expected \"24h\", \"7d\" or \"30d\")")]
pub struct TimeRangeParseError(pub String);

impl FromStr for TimeRange {
    type Err = TimeRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(TimeRange::Last24Hours),
            "7d" => Ok(TimeRange::Last7Days),
            "30d" => Ok(TimeRange::Last30Days),
            other => Err(TimeRangeParseError(other.to_string())),
        }
    }
}

/// A bounded, chart-ready series for one metric.
///
/// `labels` and `values` are index-aligned and always the same length. An
/// empty series means "no data" and is a valid output, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Query parameters for GET /enclosures/{id}/series.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub metric: Metric,

    /// Window keyword (default: 24h).
    #[serde(default = "default_range")]
    pub range: TimeRange,
}

fn default_range() -> TimeRange {
    TimeRange::Last24Hours
}

/// Response for GET /enclosures/{id}/conditions.
///
/// One evaluation per metric, all derived from the same latest reading and
/// the same resolved period.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionsResponse {
    pub enclosure_id: i64,

    /// Species the evaluation ran against, if one is assigned.
    pub species: Option<String>,

    /// Period whose thresholds were applied.
    pub period: Period,

    /// Timestamp of the reading that was evaluated, if any exists.
    pub observed_at: Option<DateTime<Utc>>,

    pub humidity: Evaluation,
    pub air_temperature: Evaluation,
    pub surface_temperature: Evaluation,
}
