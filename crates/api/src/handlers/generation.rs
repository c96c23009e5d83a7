//! Handlers for the generation engine.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use atelier_core::types::DbId;
use atelier_db::repositories::GenerationRepo;
use atelier_pipeline::service::{GenerateRequest, GenerationMode};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/generation`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateBody {
    pub user_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub garment_type: String,
    #[validate(length(max = 2000))]
    pub prompt_text: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: GenerationMode,
    #[validate(range(min = 1, max = 20))]
    pub quantity: u32,
    #[serde(default)]
    pub enforce_brand_dna: bool,
    #[validate(range(min = 0.0, max = 1.0))]
    pub brand_dna_strength: Option<f64>,
    #[serde(default)]
    pub explore: bool,
    pub seed: Option<u64>,
}

fn default_mode() -> GenerationMode {
    GenerationMode::Balanced
}

/// POST /api/v1/generation
///
/// Compose, over-generate, validate, and return the best candidates.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = GenerateRequest {
        user_id: body.user_id,
        garment_type: body.garment_type,
        prompt_text: body.prompt_text,
        mode: body.mode,
        quantity: body.quantity,
        enforce_brand_dna: body.enforce_brand_dna,
        brand_dna_strength: body.brand_dna_strength,
        explore: body.explore,
        seed: body.seed,
    };

    let response = state
        .engine
        .generate(&request, &CancellationToken::new())
        .await?;

    tracing::info!(
        user_id = request.user_id,
        batch_id = %response.batch_id,
        returned = response.candidates.len(),
        "Generation batch served"
    );

    Ok(Json(DataResponse { data: response }))
}

/// Per-status candidate counts and cost for one batch.
#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub batch_id: Uuid,
    pub pending: i64,
    pub completed: i64,
    pub failed: i64,
    pub total_cost_cents: i64,
}

/// GET /api/v1/generation/batches/{batch_id}
pub async fn batch_status(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let counts = GenerationRepo::count_by_status(&state.pool, batch_id).await?;
    if counts.is_empty() {
        return Err(AppError::Database(sqlx::Error::RowNotFound));
    }

    let count_for = |status: &str| {
        counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    };
    let total_cost_cents = GenerationRepo::batch_cost_cents(&state.pool, batch_id).await?;

    Ok(Json(DataResponse {
        data: BatchStatusResponse {
            batch_id,
            pending: count_for("pending"),
            completed: count_for("completed"),
            failed: count_for("failed"),
            total_cost_cents,
        },
    }))
}
