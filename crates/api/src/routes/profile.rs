//! Route definitions for style profiles and brand DNA.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Profile routes mounted at `/profile`.
///
/// ```text
/// POST /refresh    -> refresh_profile
/// GET  /brand-dna  -> get_brand_dna
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(profile::refresh_profile))
        .route("/brand-dna", get(profile::get_brand_dna))
}
