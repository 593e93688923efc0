//! Vivarium - Environmental condition monitoring for captive reptile habitats.
//!
//! # API Endpoints
//!
//! - `POST /enclosures` - Register an enclosure
//! - `GET /enclosures` - List enclosures
//! - `POST /readings` - Record a sensor reading
//! - `GET /enclosures/{id}/conditions` - Evaluate the latest reading
//! - `GET /enclosures/{id}/series` - Chart-ready history for one metric
//! - `GET /species` - List the species catalog
//! - `GET /health` - Health check

use std::env;
use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vivarium::api::{
    AppState, get_conditions, get_enclosures, get_series, get_species, health_check,
    post_enclosure, post_reading,
};
use vivarium::species::SpeciesCatalog;
use vivarium::storage::Storage;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
const DEFAULT_DB_PATH: &str = "sqlite:vivarium.db?mode=rwc";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vivarium=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("VIVARIUM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let db_url = env::var("VIVARIUM_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    info!(port, db_url = %db_url, "Starting Vivarium server");

    // Initialize storage
    let storage = Storage::new(&db_url).await?;
    info!("Database initialized");

    // Load the species catalog once; a misconfigured table aborts startup.
    let species = SpeciesCatalog::builtin()?;
    info!(species_count = species.len(), "Species catalog loaded");

    // Create application state
    let state = AppState { storage, species };

    // Build router
    let app = Router::new()
        .route("/enclosures", post(post_enclosure).get(get_enclosures))
        .route("/readings", post(post_reading))
        .route("/enclosures/:id/conditions", get(get_conditions))
        .route("/enclosures/:id/series", get(get_series))
        .route("/species", get(get_species))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Vivarium is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
