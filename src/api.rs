//! HTTP API handlers for Vivarium.
//!
//! Handlers stay thin: they resolve wall-clock inputs (the current instant,
//! the local period), call into storage and the pure evaluation/charting
//! modules, and map outcomes onto status codes. Absence of data degrades to
//! "unknown"/empty payloads; only a missing enclosure is a 404 and only
//! storage failures are 500s. Malformed metric or range keywords never reach
//! the handlers at all — the closed enums reject them at deserialization.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Local, Utc};
use tracing::{info, instrument, warn};

use crate::charting::shape;
use crate::evaluation::classify;
use crate::model::{
    ChartSeries, ConditionsResponse, Enclosure, Metric, NewEnclosure, Period, ReadingRequest,
    SeriesQuery,
};
use crate::species::{SpeciesCatalog, SpeciesProfile};
use crate::storage::Storage;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub species: SpeciesCatalog,
}

/// POST /enclosures - Register a new enclosure.
///
/// # Request Body
///
/// ```json
/// {
///     "name": "Terrarium 3",
///     "species": "Leopard Gecko",
///     "description": "Front room"
/// }
/// ```
///
/// Species and description are optional. Returns `201 Created` with the
/// stored enclosure.
#[instrument(skip(state), fields(name = %request.name))]
pub async fn post_enclosure(
    State(state): State<AppState>,
    Json(request): Json<NewEnclosure>,
) -> Result<(StatusCode, Json<Enclosure>), StatusCode> {
    if let Some(species) = &request.species
        && state.species.lookup(species).is_none()
    {
        // Not fatal: the enclosure still records readings, it just cannot be
        // evaluated until the catalog knows the species.
        warn!(species = %species, "Enclosure registered with species missing from catalog");
    }

    match state.storage.create_enclosure(&request).await {
        Ok(enclosure) => {
            info!(
                enclosure_id = enclosure.id,
                species = ?enclosure.species,
                "Enclosure registered"
            );
            Ok((StatusCode::CREATED, Json(enclosure)))
        }
        Err(e) => {
            warn!(name = %request.name, error = %e, "Failed to register enclosure");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /enclosures - List all registered enclosures.
#[instrument(skip(state))]
pub async fn get_enclosures(
    State(state): State<AppState>,
) -> Result<Json<Vec<Enclosure>>, StatusCode> {
    match state.storage.list_enclosures().await {
        Ok(enclosures) => Ok(Json(enclosures)),
        Err(e) => {
            warn!(error = %e, "Failed to list enclosures");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /readings - Record a sensor reading.
///
/// # Request Body
///
/// ```json
/// {
///     "enclosure_id": 1,
///     "humidity": 42.5,
///     "air_temperature": 26.1
/// }
/// ```
///
/// Each metric is independently optional; a missing metric stays "no data".
/// The timestamp is optional and server-assigned when absent. Returns
/// `202 Accepted`, or `404 Not Found` for an unknown enclosure.
#[instrument(skip(state), fields(enclosure_id = request.enclosure_id))]
pub async fn post_reading(
    State(state): State<AppState>,
    Json(request): Json<ReadingRequest>,
) -> Result<StatusCode, StatusCode> {
    let enclosure = state
        .storage
        .get_enclosure(request.enclosure_id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to look up enclosure for reading");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if enclosure.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    let reading = request.into_new_reading(Utc::now());

    match state.storage.insert_reading(&reading).await {
        Ok(id) => {
            info!(
                reading_id = id,
                enclosure_id = reading.enclosure_id,
                "Reading recorded"
            );
            Ok(StatusCode::ACCEPTED)
        }
        Err(e) => {
            warn!(
                enclosure_id = reading.enclosure_id,
                error = %e,
                "Failed to record reading"
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /enclosures/{id}/conditions - Evaluate the latest reading.
///
/// Classifies each metric of the most recent reading against the enclosure's
/// species profile, using the thresholds for the current local period.
///
/// # Response
///
/// ```json
/// {
///     "enclosure_id": 1,
///     "species": "Leopard Gecko",
///     "period": "day",
///     "observed_at": "2025-06-01T10:30:00Z",
///     "humidity": { "value": "35.0%", "severity": "optimal", "color": "#4ade80" },
///     "air_temperature": { "value": "27.3°C", "severity": "optimal", "color": "#4ade80" },
///     "surface_temperature": { "value": "N/A", "severity": "unknown", "color": "#a1a1aa" }
/// }
/// ```
///
/// A missing species assignment, missing reading, or missing metric all
/// degrade to the "unknown" evaluation; none of them are errors.
#[instrument(skip(state))]
pub async fn get_conditions(
    State(state): State<AppState>,
    Path(enclosure_id): Path<i64>,
) -> Result<Json<ConditionsResponse>, StatusCode> {
    let enclosure = state
        .storage
        .get_enclosure(enclosure_id)
        .await
        .map_err(|e| {
            warn!(enclosure_id, error = %e, "Failed to fetch enclosure");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let latest = state
        .storage
        .latest_reading(enclosure_id)
        .await
        .map_err(|e| {
            warn!(enclosure_id, error = %e, "Failed to fetch latest reading");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let profile = enclosure
        .species
        .as_deref()
        .and_then(|species| state.species.lookup(species));

    let period = Period::of(&Local::now());
    let value = |metric| latest.as_ref().and_then(|r| r.value_of(metric));

    let response = ConditionsResponse {
        enclosure_id,
        species: enclosure.species.clone(),
        period,
        observed_at: latest.as_ref().map(|r| r.timestamp),
        humidity: classify(value(Metric::Humidity), profile, Metric::Humidity, period),
        air_temperature: classify(
            value(Metric::AirTemperature),
            profile,
            Metric::AirTemperature,
            period,
        ),
        surface_temperature: classify(
            value(Metric::SurfaceTemperature),
            profile,
            Metric::SurfaceTemperature,
            period,
        ),
    };

    info!(
        enclosure_id,
        period = ?period,
        humidity = ?response.humidity.severity,
        air = ?response.air_temperature.severity,
        surface = ?response.surface_temperature.severity,
        "Conditions evaluated"
    );

    Ok(Json(response))
}

/// GET /enclosures/{id}/series - Chart-ready history for one metric.
///
/// # Query Parameters
///
/// - `metric` (required): `humidity`, `air_temperature` or `surface_temperature`
/// - `range` (optional): `24h` (default), `7d` or `30d`
///
/// Plans the window from the range keyword, fetches readings since the
/// window start, and shapes them into at most 24 labeled points. An empty
/// series means no data in the window; it is not an error.
#[instrument(skip(state))]
pub async fn get_series(
    State(state): State<AppState>,
    Path(enclosure_id): Path<i64>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ChartSeries>, StatusCode> {
    state
        .storage
        .get_enclosure(enclosure_id)
        .await
        .map_err(|e| {
            warn!(enclosure_id, error = %e, "Failed to fetch enclosure");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let since = query.range.start_from(Utc::now());

    match state.storage.fetch_readings(enclosure_id, since).await {
        Ok(readings) => {
            let series = shape(&readings, query.metric);
            info!(
                enclosure_id,
                metric = ?query.metric,
                range = %query.range,
                fetched = readings.len(),
                points = series.len(),
                "Series shaped"
            );
            Ok(Json(series))
        }
        Err(e) => {
            warn!(
                enclosure_id,
                range = %query.range,
                error = %e,
                "Failed to fetch readings"
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /species - List the species catalog.
#[instrument(skip(state))]
pub async fn get_species(State(state): State<AppState>) -> Json<Vec<SpeciesProfile>> {
    Json(state.species.all().into_iter().cloned().collect())
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
