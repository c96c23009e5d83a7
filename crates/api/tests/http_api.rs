//! HTTP-level integration tests: health, request validation, and error
//! envelopes. Endpoints that need live external services are covered by
//! the pipeline's scenario tests; here the clients point at closed ports.

mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, get, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Health and generic HTTP behaviour
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("response must carry a request id");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_rejects_zero_quantity(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/generation",
        serde_json::json!({
            "user_id": 1,
            "garment_type": "dress",
            "quantity": 0,
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_rejects_out_of_range_strength(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/generation",
        serde_json::json!({
            "user_id": 1,
            "garment_type": "dress",
            "quantity": 4,
            "enforce_brand_dna": true,
            "brand_dna_strength": 1.5,
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feedback_rejects_unknown_type(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/feedback",
        serde_json::json!({
            "user_id": 1,
            "generation_id": 1,
            "feedback_type": "applause",
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feedback_on_unknown_generation_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/feedback",
        serde_json::json!({
            "user_id": 1,
            "generation_id": 424242,
            "feedback_type": "like",
        }),
    )
    .await;

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_batch_status_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(
        app,
        "/api/v1/generation/batches/00000000-0000-0000-0000-000000000000",
    )
    .await;

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Profile endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn brand_dna_missing_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/profile/brand-dna?user_id=1").await;

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_refresh_round_trips_brand_dna(pool: PgPool) {
    let record = serde_json::json!({
        "garment_type": "dress",
        "colors": ["navy"],
        "fabrics": ["wool"],
        "construction": ["tailored"],
        "style_aesthetic": "minimalist",
        "confidence": 0.9,
    });
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/profile/refresh",
        serde_json::json!({
            "user_id": 1,
            "images": [record.clone(), record.clone(), record],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["primary_aesthetic"], "minimalist");

    let response = get(app, "/api/v1/profile/brand-dna?user_id=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["primary_aesthetic"], "minimalist");
    assert!(json["data"]["signature_colors"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("navy")));
}

// ---------------------------------------------------------------------------
// Learning endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn learning_stats_start_empty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/learning/stats?user_id=1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_events"], 0);
    assert!(json["data"]["success_rate"].is_null());
}
