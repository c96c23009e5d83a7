//! Handlers for feedback ingestion.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use atelier_core::feedback::FeedbackType;
use atelier_core::types::DbId;
use atelier_pipeline::learner::FeedbackRequest;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/feedback`.
#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackBody {
    pub user_id: DbId,
    pub generation_id: DbId,
    /// One of `like`, `dislike`, `save`, `share`, `comment`.
    pub feedback_type: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// POST /api/v1/feedback
///
/// Record one feedback event and fold it into the user's token weights.
/// Repeating the same reaction for the same candidate is a no-op.
pub async fn record_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let feedback_type = FeedbackType::parse(&body.feedback_type)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = state
        .engine
        .feedback(&FeedbackRequest {
            user_id: body.user_id,
            generation_id: body.generation_id,
            feedback_type,
            note: body.note,
        })
        .await?;

    tracing::info!(
        user_id = body.user_id,
        generation_id = body.generation_id,
        feedback_type = %feedback_type,
        accepted = outcome.accepted,
        "Feedback recorded"
    );

    Ok(Json(DataResponse { data: outcome }))
}
