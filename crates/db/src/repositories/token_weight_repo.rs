//! Repository for the `token_weights` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::token_weight::{GlobalTokenWeight, RecordObservation, TokenWeight};

/// Column list for `token_weights` SELECT queries.
const COLUMNS: &str = "id, user_id, category, token_value, alpha, beta, times_used, updated_at";

/// Provides query operations for per-token Beta posteriors.
pub struct TokenWeightRepo;

impl TokenWeightRepo {
    /// Record one observation, creating the row at the uniform prior if it
    /// does not exist. The increment is a single atomic statement so
    /// concurrent feedback never loses an update.
    pub async fn record_observation(
        pool: &PgPool,
        obs: &RecordObservation,
    ) -> Result<TokenWeight, sqlx::Error> {
        let (da, db) = if obs.success { (1.0, 0.0) } else { (0.0, 1.0) };
        let query = format!(
            "INSERT INTO token_weights (user_id, category, token_value, alpha, beta) \
             VALUES ($1, $2, $3, 1.0 + $4, 1.0 + $5) \
             ON CONFLICT (user_id, category, token_value) DO UPDATE SET \
                 alpha = token_weights.alpha + $4, \
                 beta = token_weights.beta + $5, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TokenWeight>(&query)
            .bind(obs.user_id)
            .bind(&obs.category)
            .bind(&obs.token_value)
            .bind(da)
            .bind(db)
            .fetch_one(pool)
            .await
    }

    /// All posterior rows for a user.
    pub async fn get_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<TokenWeight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM token_weights WHERE user_id = $1 \
             ORDER BY category, token_value"
        );
        sqlx::query_as::<_, TokenWeight>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Posterior rows for one category of a user.
    pub async fn get_for_user_category(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
    ) -> Result<Vec<TokenWeight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM token_weights \
             WHERE user_id = $1 AND category = $2 \
             ORDER BY token_value"
        );
        sqlx::query_as::<_, TokenWeight>(&query)
            .bind(user_id)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Mark a token as used by a composed prompt, creating the row at the
    /// uniform prior if needed.
    pub async fn record_usage(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
        token_value: &str,
    ) -> Result<TokenWeight, sqlx::Error> {
        let query = format!(
            "INSERT INTO token_weights (user_id, category, token_value, times_used) \
             VALUES ($1, $2, $3, 1) \
             ON CONFLICT (user_id, category, token_value) DO UPDATE SET \
                 times_used = token_weights.times_used + 1, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TokenWeight>(&query)
            .bind(user_id)
            .bind(category)
            .bind(token_value)
            .fetch_one(pool)
            .await
    }

    /// Cross-user evidence pooled per token. Each row's successes and
    /// failures are the observation counts above the uniform prior.
    pub async fn get_global(pool: &PgPool) -> Result<Vec<GlobalTokenWeight>, sqlx::Error> {
        sqlx::query_as::<_, GlobalTokenWeight>(
            "SELECT category, token_value, \
                    SUM(alpha - 1.0) AS successes, \
                    SUM(beta - 1.0) AS failures \
             FROM token_weights \
             GROUP BY category, token_value \
             ORDER BY category, token_value",
        )
        .fetch_all(pool)
        .await
    }

    /// Top tokens for a user's category ranked by posterior mean.
    pub async fn top_for_user_category(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
        limit: i64,
    ) -> Result<Vec<TokenWeight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM token_weights \
             WHERE user_id = $1 AND category = $2 \
             ORDER BY alpha / (alpha + beta) DESC, token_value \
             LIMIT $3"
        );
        sqlx::query_as::<_, TokenWeight>(&query)
            .bind(user_id)
            .bind(category)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total directional observations a user has in one category.
    pub async fn category_observations(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
    ) -> Result<f64, sqlx::Error> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(alpha - 1.0 + beta - 1.0) FROM token_weights \
             WHERE user_id = $1 AND category = $2",
        )
        .bind(user_id)
        .bind(category)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(0.0))
    }
}
