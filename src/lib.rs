//! Vivarium - Environmental condition monitoring for captive reptile habitats.
//!
//! # Overview
//!
//! Vivarium compares sensor readings (humidity, air temperature, surface
//! temperature) from monitored enclosures against species-specific optimal
//! ranges and serves the results as status and trend information. Each
//! species carries separate day and night bands plus an optional basking
//! band; readings classify into a severity tier by how far they sit outside
//! the applicable band, and reading histories are decimated into bounded,
//! chart-ready series.
//!
//! The decision logic is pure and clock-free: the evaluation instant and the
//! fetched history are always explicit inputs, so the same call with the same
//! inputs yields the same answer.
//!
//! # Modules
//!
//! - [`model`]: Readings, enclosures, severities, periods, time windows
//! - [`species`]: Per-species optimal-range profiles and the catalog lookup
//! - [`evaluation`]: Classifying a reading against the applicable band
//! - [`charting`]: Downsampling reading histories for display
//! - [`storage`]: SQLite store for enclosures and readings
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod charting;
pub mod evaluation;
pub mod model;
pub mod species;
pub mod storage;
