//! Handlers for style profiles and brand DNA.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use atelier_core::error::CoreError;
use atelier_core::profile::GarmentAttributes;
use atelier_core::types::DbId;
use atelier_db::repositories::BrandDnaRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/profile/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshProfileBody {
    pub user_id: DbId,
    /// Analyst output for each portfolio image.
    pub images: Vec<GarmentAttributes>,
}

/// POST /api/v1/profile/refresh
///
/// Rebuild the user's style profile from analyzed portfolio images and
/// re-extract their brand DNA. Returns the new DNA, including its drift
/// against the previous extraction.
pub async fn refresh_profile(
    State(state): State<AppState>,
    Json(body): Json<RefreshProfileBody>,
) -> AppResult<impl IntoResponse> {
    let dna = state
        .engine
        .refresh_style_profile(body.user_id, &body.images)
        .await?;

    tracing::info!(
        user_id = body.user_id,
        images = body.images.len(),
        drift = dna.drift_score,
        "Style profile refreshed"
    );

    Ok(Json(DataResponse { data: dna }))
}

/// Query parameters identifying a user.
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: DbId,
}

/// GET /api/v1/profile/brand-dna?user_id=
pub async fn get_brand_dna(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<impl IntoResponse> {
    let row = BrandDnaRepo::get_by_user(&state.pool, params.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BrandDna",
            id: params.user_id,
        }))?;
    let dna = row
        .to_domain()
        .map_err(|e| AppError::InternalError(format!("corrupt brand DNA: {e}")))?;

    Ok(Json(DataResponse { data: dna }))
}
