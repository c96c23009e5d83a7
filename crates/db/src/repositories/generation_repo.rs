//! Repository for the `generation_candidates` table.

use sqlx::PgPool;
use uuid::Uuid;

use atelier_core::types::DbId;

use crate::models::generation::{
    BatchStatusCount, CandidateResult, CreateCandidate, GenerationCandidate,
};

/// Column list for `generation_candidates` SELECT queries.
const COLUMNS: &str = "\
    id, batch_id, user_id, prompt_artifact_id, status, image_url, storage_key, \
    provider, cost_cents, error_message, created_at, updated_at";

/// Provides query operations for candidate images.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Insert a pending candidate.
    pub async fn insert(
        pool: &PgPool,
        candidate: &CreateCandidate,
    ) -> Result<GenerationCandidate, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_candidates (batch_id, user_id, prompt_artifact_id, status) \
             VALUES ($1, $2, $3, 'pending') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationCandidate>(&query)
            .bind(candidate.batch_id)
            .bind(candidate.user_id)
            .bind(candidate.prompt_artifact_id)
            .fetch_one(pool)
            .await
    }

    /// Record a successful provider call and move the candidate to its
    /// terminal `completed` status.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        result: &CandidateResult,
    ) -> Result<GenerationCandidate, sqlx::Error> {
        let query = format!(
            "UPDATE generation_candidates SET \
                 status = 'completed', image_url = $2, storage_key = $3, \
                 provider = $4, cost_cents = $5, updated_at = now() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationCandidate>(&query)
            .bind(id)
            .bind(&result.image_url)
            .bind(&result.storage_key)
            .bind(&result.provider)
            .bind(result.cost_cents)
            .fetch_one(pool)
            .await
    }

    /// Record a provider failure (terminal).
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
    ) -> Result<GenerationCandidate, sqlx::Error> {
        let query = format!(
            "UPDATE generation_candidates SET \
                 status = 'failed', error_message = $2, updated_at = now() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationCandidate>(&query)
            .bind(id)
            .bind(error_message)
            .fetch_one(pool)
            .await
    }

    /// Get a candidate by id.
    pub async fn get_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GenerationCandidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_candidates WHERE id = $1");
        sqlx::query_as::<_, GenerationCandidate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All candidates in a batch.
    pub async fn get_by_batch(
        pool: &PgPool,
        batch_id: Uuid,
    ) -> Result<Vec<GenerationCandidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_candidates WHERE batch_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, GenerationCandidate>(&query)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }

    /// Per-status counts for a batch.
    pub async fn count_by_status(
        pool: &PgPool,
        batch_id: Uuid,
    ) -> Result<Vec<BatchStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, BatchStatusCount>(
            "SELECT status, COUNT(*) AS count FROM generation_candidates \
             WHERE batch_id = $1 GROUP BY status ORDER BY status",
        )
        .bind(batch_id)
        .fetch_all(pool)
        .await
    }

    /// Total provider spend for a batch, in cents.
    pub async fn batch_cost_cents(pool: &PgPool, batch_id: Uuid) -> Result<i64, sqlx::Error> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(cost_cents)::BIGINT FROM generation_candidates WHERE batch_id = $1",
        )
        .bind(batch_id)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(0))
    }
}
