//! Repository for the `validation_results` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::validation::{CreateValidationResult, ValidationResultRow};

/// Column list for `validation_results` SELECT queries.
const COLUMNS: &str = "\
    id, generation_id, consistency_score, style_score, outlier_score, \
    overall_score, is_outlier, decision, rejection_reason, comparisons_json, \
    created_at";

/// Provides query operations for validation results.
pub struct ValidationRepo;

impl ValidationRepo {
    /// Insert the validation result for a candidate.
    pub async fn insert(
        pool: &PgPool,
        result: &CreateValidationResult,
    ) -> Result<ValidationResultRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO validation_results \
                 (generation_id, consistency_score, style_score, outlier_score, \
                  overall_score, is_outlier, decision, rejection_reason, comparisons_json) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ValidationResultRow>(&query)
            .bind(result.generation_id)
            .bind(result.consistency_score)
            .bind(result.style_score)
            .bind(result.outlier_score)
            .bind(result.overall_score)
            .bind(result.is_outlier)
            .bind(&result.decision)
            .bind(&result.rejection_reason)
            .bind(&result.comparisons_json)
            .fetch_one(pool)
            .await
    }

    /// Latest validation result for one candidate. The table is insert-only,
    /// so a re-validated candidate has several rows.
    pub async fn get_by_generation(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<Option<ValidationResultRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM validation_results WHERE generation_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, ValidationResultRow>(&query)
            .bind(generation_id)
            .fetch_optional(pool)
            .await
    }

    /// Mean overall score of a user's most recent accepted candidates.
    /// `None` until the user has validation history.
    pub async fn success_baseline(
        pool: &PgPool,
        user_id: DbId,
        window: i64,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT AVG(overall_score) FROM ( \
                 SELECT v.overall_score \
                 FROM validation_results v \
                 JOIN generation_candidates g ON g.id = v.generation_id \
                 WHERE g.user_id = $1 AND v.decision = 'accepted' \
                 ORDER BY v.created_at DESC \
                 LIMIT $2 \
             ) recent",
        )
        .bind(user_id)
        .bind(window)
        .fetch_one(pool)
        .await
    }
}
