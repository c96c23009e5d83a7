//! Handlers for the learning read APIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use atelier_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters identifying a user.
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: DbId,
}

/// GET /api/v1/learning/weights?user_id=
///
/// Every tracked token posterior for the user.
pub async fn get_weights(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<impl IntoResponse> {
    let weights = state.engine.learner().get_weights(params.user_id).await?;

    Ok(Json(DataResponse { data: weights }))
}

/// Query parameters for the top-token listing.
#[derive(Debug, Deserialize)]
pub struct TopTokensParams {
    pub user_id: DbId,
    pub category: String,
    pub limit: Option<i64>,
}

/// GET /api/v1/learning/top?user_id=&category=&limit=
///
/// Top tokens in one category ranked by posterior mean.
pub async fn get_top_tokens(
    State(state): State<AppState>,
    Query(params): Query<TopTokensParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let tokens = state
        .engine
        .learner()
        .get_top_tokens(params.user_id, &params.category, limit)
        .await?;

    Ok(Json(DataResponse { data: tokens }))
}

/// GET /api/v1/learning/stats?user_id=
///
/// Aggregate feedback statistics for the user.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<impl IntoResponse> {
    let stats = state
        .engine
        .learner()
        .get_learning_stats(params.user_id)
        .await?;

    Ok(Json(DataResponse { data: stats }))
}
