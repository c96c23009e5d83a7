//! Repository for the `rlhf_examples` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::rlhf::{CreateRlhfExample, RlhfExample};

/// Column list for `rlhf_examples` SELECT queries.
const COLUMNS: &str = "\
    id, generation_id, user_id, disposition, positive_prompt, overall_score, \
    metadata_json, created_at";

/// Provides query operations for archived training examples.
pub struct RlhfRepo;

impl RlhfRepo {
    /// Archive an unselected candidate. A candidate is archived at most
    /// once; a second attempt returns the existing row untouched.
    pub async fn insert(
        pool: &PgPool,
        example: &CreateRlhfExample,
    ) -> Result<RlhfExample, sqlx::Error> {
        let query = format!(
            "INSERT INTO rlhf_examples \
                 (generation_id, user_id, disposition, positive_prompt, \
                  overall_score, metadata_json) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (generation_id) DO UPDATE SET generation_id = EXCLUDED.generation_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RlhfExample>(&query)
            .bind(example.generation_id)
            .bind(example.user_id)
            .bind(&example.disposition)
            .bind(&example.positive_prompt)
            .bind(example.overall_score)
            .bind(&example.metadata_json)
            .fetch_one(pool)
            .await
    }

    /// Whether a candidate has been archived.
    pub async fn exists_for_generation(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM rlhf_examples WHERE generation_id = $1")
                .bind(generation_id)
                .fetch_optional(pool)
                .await?;
        Ok(found.is_some())
    }

    /// A user's archived examples, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<RlhfExample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rlhf_examples \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, RlhfExample>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
