//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use atelier_api::config::ServerConfig;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_pipeline::{EngineConfig, GenerationService};
use atelier_provider::{HttpGenerationProvider, HttpObjectStorage, HttpVisualAnalyst};

/// Build a test `ServerConfig` with safe defaults. The external service
/// URLs point nowhere; tests that reach them are expected to see failures
/// handled gracefully.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_base_url: "http://127.0.0.1:1".to_string(),
        generation_api_key: String::new(),
        analyst_base_url: "http://127.0.0.1:1".to_string(),
        analyst_api_key: String::new(),
        storage_base_url: "http://127.0.0.1:1".to_string(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors the construction in `main.rs` so the tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(atelier_events::EventBus::default());

    let provider = Arc::new(HttpGenerationProvider::new(
        config.generation_base_url.clone(),
        config.generation_api_key.clone(),
    ));
    let analyst = Arc::new(HttpVisualAnalyst::new(
        config.analyst_base_url.clone(),
        config.analyst_api_key.clone(),
    ));
    let storage = Arc::new(HttpObjectStorage::new(config.storage_base_url.clone()));

    let engine = Arc::new(GenerationService::new(
        pool.clone(),
        provider,
        analyst,
        storage,
        Arc::clone(&event_bus),
        EngineConfig {
            pacing_ms: 0,
            call_timeout_secs: 1,
            batch_timeout_secs: 5,
            ..EngineConfig::default()
        },
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
        event_bus,
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build"),
    )
    .await
    .expect("request should not fail")
}

/// Send a POST request with a JSON body and return the raw response.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
    )
    .await
    .expect("request should not fail")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert a `{ "error", "code" }` envelope with the given status and code.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    assert!(json["error"].is_string());
}
