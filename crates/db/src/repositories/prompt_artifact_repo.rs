//! Repository for the `prompt_artifacts` table.

use sqlx::PgPool;
use uuid::Uuid;

use atelier_core::types::DbId;

use crate::models::prompt_artifact::{CreatePromptArtifact, PromptArtifact};

/// Column list for `prompt_artifacts` SELECT queries.
const COLUMNS: &str = "\
    id, batch_id, user_id, builder_variant, positive_prompt, negative_prompt, \
    seed, metadata_json, combination_key, created_at";

/// Provides query operations for composed prompt artifacts.
pub struct PromptArtifactRepo;

impl PromptArtifactRepo {
    /// Insert a composed prompt.
    pub async fn insert(
        pool: &PgPool,
        artifact: &CreatePromptArtifact,
    ) -> Result<PromptArtifact, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompt_artifacts \
                 (batch_id, user_id, builder_variant, positive_prompt, \
                  negative_prompt, seed, metadata_json, combination_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptArtifact>(&query)
            .bind(artifact.batch_id)
            .bind(artifact.user_id)
            .bind(&artifact.builder_variant)
            .bind(&artifact.positive_prompt)
            .bind(&artifact.negative_prompt)
            .bind(artifact.seed)
            .bind(&artifact.metadata_json)
            .bind(&artifact.combination_key)
            .fetch_one(pool)
            .await
    }

    /// Get an artifact by id.
    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<PromptArtifact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompt_artifacts WHERE id = $1");
        sqlx::query_as::<_, PromptArtifact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All artifacts composed for one batch.
    pub async fn get_by_batch(
        pool: &PgPool,
        batch_id: Uuid,
    ) -> Result<Vec<PromptArtifact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompt_artifacts WHERE batch_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, PromptArtifact>(&query)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }
}
