//! Integration tests for Vivarium API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use axum::{Router, routing::get, routing::post};
use axum_test::TestServer;
use serde_json::json;

use vivarium::api::{
    AppState, get_conditions, get_enclosures, get_series, get_species, health_check,
    post_enclosure, post_reading,
};
use vivarium::species::SpeciesCatalog;
use vivarium::storage::Storage;

async fn create_test_server() -> TestServer {
    let storage = Storage::new("sqlite::memory:").await.unwrap();
    let state = AppState {
        storage,
        species: SpeciesCatalog::builtin().unwrap(),
    };

    let app = Router::new()
        .route("/enclosures", post(post_enclosure).get(get_enclosures))
        .route("/readings", post(post_reading))
        .route("/enclosures/:id/conditions", get(get_conditions))
        .route("/enclosures/:id/series", get(get_series))
        .route("/species", get(get_species))
        .route("/health", get(health_check))
        .with_state(state);

    TestServer::new(app).unwrap()
}

/// Register an enclosure and return its id.
async fn register_enclosure(server: &TestServer, name: &str, species: Option<&str>) -> i64 {
    let mut body = json!({ "name": name });
    if let Some(species) = species {
        body["species"] = json!(species);
    }

    let response = server.post("/enclosures").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_and_list_enclosures() {
    let server = create_test_server().await;

    let id = register_enclosure(&server, "Terrarium 1", Some("Leopard Gecko")).await;
    register_enclosure(&server, "Terrarium 2", None).await;

    let response = server.get("/enclosures").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let enclosures = body.as_array().unwrap();
    assert_eq!(enclosures.len(), 2);
    assert_eq!(enclosures[0]["id"], id);
    assert_eq!(enclosures[0]["species"], "Leopard Gecko");
    assert_eq!(enclosures[1]["species"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_post_reading() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", Some("Leopard Gecko")).await;

    let response = server
        .post("/readings")
        .json(&json!({
            "enclosure_id": id,
            "humidity": 35.0,
            "air_temperature": 27.0,
            "surface_temperature": 32.0
        }))
        .await;

    response.assert_status(axum::http::StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_post_reading_partial_metrics() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    // Only humidity present; the other metrics stay "no data".
    let response = server
        .post("/readings")
        .json(&json!({
            "enclosure_id": id,
            "humidity": 55.0
        }))
        .await;

    response.assert_status(axum::http::StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_post_reading_unknown_enclosure() {
    let server = create_test_server().await;

    let response = server
        .post("/readings")
        .json(&json!({
            "enclosure_id": 999,
            "humidity": 55.0
        }))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conditions_unknown_without_readings() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", Some("Leopard Gecko")).await;

    let response = server.get(&format!("/enclosures/{id}/conditions")).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["enclosure_id"], id);
    assert_eq!(body["observed_at"], serde_json::Value::Null);
    for metric in ["humidity", "air_temperature", "surface_temperature"] {
        assert_eq!(body[metric]["severity"], "unknown");
        assert_eq!(body[metric]["value"], "N/A");
        assert_eq!(body[metric]["color"], "#a1a1aa");
    }
}

#[tokio::test]
async fn test_conditions_unknown_without_species() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    server
        .post("/readings")
        .json(&json!({
            "enclosure_id": id,
            "humidity": 35.0,
            "air_temperature": 27.0
        }))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    let response = server.get(&format!("/enclosures/{id}/conditions")).await;
    response.assert_status_ok();

    // A reading exists but there is nothing to evaluate against.
    let body: serde_json::Value = response.json();
    assert_eq!(body["species"], serde_json::Value::Null);
    assert!(body["observed_at"].is_string());
    assert_eq!(body["humidity"]["severity"], "unknown");
    assert_eq!(body["air_temperature"]["severity"], "unknown");
}

#[tokio::test]
async fn test_conditions_classifies_latest_reading() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", Some("Leopard Gecko")).await;

    // Surface temperature inside the Leopard basking band (30..35), which
    // applies day and night, so this asserts optimal regardless of when the
    // test runs.
    server
        .post("/readings")
        .json(&json!({
            "enclosure_id": id,
            "surface_temperature": 32.0
        }))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    let response = server.get(&format!("/enclosures/{id}/conditions")).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["species"], "Leopard Gecko");
    assert!(body["period"] == "day" || body["period"] == "night");
    assert_eq!(body["surface_temperature"]["severity"], "optimal");
    assert_eq!(body["surface_temperature"]["value"], "32.0°C");
    assert_eq!(body["surface_temperature"]["color"], "#4ade80");
    // Metrics absent from the reading degrade independently.
    assert_eq!(body["humidity"]["severity"], "unknown");
}

#[tokio::test]
async fn test_conditions_missing_enclosure() {
    let server = create_test_server().await;

    let response = server.get("/enclosures/999/conditions").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_series_empty_without_readings() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    let response = server
        .get(&format!("/enclosures/{id}/series"))
        .add_query_param("metric", "humidity")
        .add_query_param("range", "24h")
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["labels"].as_array().unwrap().is_empty());
    assert!(body["values"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_series_returns_recorded_values() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    for humidity in [40.0, 41.0, 42.0] {
        server
            .post("/readings")
            .json(&json!({
                "enclosure_id": id,
                "humidity": humidity
            }))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);
    }

    let response = server
        .get(&format!("/enclosures/{id}/series"))
        .add_query_param("metric", "humidity")
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let values: Vec<f64> = body["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![40.0, 41.0, 42.0]);
    assert_eq!(body["labels"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_series_filters_absent_metric() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    server
        .post("/readings")
        .json(&json!({
            "enclosure_id": id,
            "air_temperature": 25.0
        }))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    // The reading exists but carries no humidity; the humidity series is
    // empty, not zero-filled.
    let response = server
        .get(&format!("/enclosures/{id}/series"))
        .add_query_param("metric", "humidity")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["values"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_series_rejects_unknown_range_keyword() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    let response = server
        .get(&format!("/enclosures/{id}/series"))
        .add_query_param("metric", "humidity")
        .add_query_param("range", "90d")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_series_rejects_unknown_metric() {
    let server = create_test_server().await;
    let id = register_enclosure(&server, "Terrarium 1", None).await;

    let response = server
        .get(&format!("/enclosures/{id}/series"))
        .add_query_param("metric", "pressure")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_series_missing_enclosure() {
    let server = create_test_server().await;

    let response = server
        .get("/enclosures/999/series")
        .add_query_param("metric", "humidity")
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_species_catalog_listing() {
    let server = create_test_server().await;

    let response = server.get("/species").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let species = body.as_array().unwrap();
    assert_eq!(species.len(), 5);

    let leopard = species
        .iter()
        .find(|s| s["species"] == "Leopard Gecko")
        .unwrap();
    assert_eq!(leopard["temperature"]["day"]["min"], 24.0);
    assert_eq!(leopard["temperature"]["basking"]["ideal"], 32.0);
    assert_eq!(leopard["humidity"]["night"]["max"], 50.0);

    // No basking band is serialized for species without one.
    let crested = species
        .iter()
        .find(|s| s["species"] == "Crested Gecko")
        .unwrap();
    assert!(crested["temperature"].get("basking").is_none());
}

#[tokio::test]
async fn test_full_workflow() {
    let server = create_test_server().await;

    // 1. Health check
    server.get("/health").await.assert_status_ok();

    // 2. Register enclosures and feed readings
    let leopard = register_enclosure(&server, "Desert tank", Some("Leopard Gecko")).await;
    let empty = register_enclosure(&server, "Quarantine", None).await;

    for _ in 0..3 {
        server
            .post("/readings")
            .json(&json!({
                "enclosure_id": leopard,
                "humidity": 35.0,
                "surface_temperature": 32.0
            }))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);
    }

    // 3. Current conditions: the basking band keeps surface optimal
    let response = server
        .get(&format!("/enclosures/{leopard}/conditions"))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["surface_temperature"]["severity"], "optimal");

    // 4. Series for the fed metric has points; the unassigned tank has none
    let response = server
        .get(&format!("/enclosures/{leopard}/series"))
        .add_query_param("metric", "surface_temperature")
        .add_query_param("range", "7d")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["values"].as_array().unwrap().len(), 3);

    let response = server
        .get(&format!("/enclosures/{empty}/series"))
        .add_query_param("metric", "humidity")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["values"].as_array().unwrap().is_empty());
}
