pub mod feedback;
pub mod generation;
pub mod health;
pub mod learning;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generation                        generate a batch (POST)
/// /generation/batches/{batch_id}     batch status (GET)
///
/// /feedback                          record a feedback event (POST)
///
/// /profile/refresh                   rebuild style profile + brand DNA (POST)
/// /profile/brand-dna                 current brand DNA (GET)
///
/// /learning/weights                  all token posteriors for a user (GET)
/// /learning/top                      top tokens in a category (GET)
/// /learning/stats                    aggregate feedback statistics (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/generation", generation::router())
        .nest("/feedback", feedback::router())
        .nest("/profile", profile::router())
        .nest("/learning", learning::router())
}
