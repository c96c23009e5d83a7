//! Route definitions for feedback ingestion.

use axum::routing::post;
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Feedback routes mounted at `/feedback`.
///
/// ```text
/// POST / -> record_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(feedback::record_feedback))
}
