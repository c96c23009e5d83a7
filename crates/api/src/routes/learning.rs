//! Route definitions for learning read APIs.

use axum::routing::get;
use axum::Router;

use crate::handlers::learning;
use crate::state::AppState;

/// Learning routes mounted at `/learning`.
///
/// ```text
/// GET /weights -> get_weights
/// GET /top     -> get_top_tokens
/// GET /stats   -> get_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weights", get(learning::get_weights))
        .route("/top", get(learning::get_top_tokens))
        .route("/stats", get(learning::get_stats))
}
