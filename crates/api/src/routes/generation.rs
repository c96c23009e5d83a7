//! Route definitions for the generation engine.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Generation routes mounted at `/generation`.
///
/// ```text
/// POST /                        -> generate
/// GET  /batches/{batch_id}      -> batch_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generation::generate))
        .route("/batches/{batch_id}", get(generation::batch_status))
}
