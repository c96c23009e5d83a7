//! Weight store abstraction over the persisted bandit posteriors.
//!
//! The composer and learner talk to [`WeightStore`] so they can be
//! exercised against an in-memory implementation; [`PgWeightStore`] is
//! the production implementation over the `token_weights` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use atelier_core::bandit::{blend_posteriors, TokenPosterior};
use atelier_core::token::TokenCategory;
use atelier_core::types::DbId;
use atelier_db::models::token_weight::RecordObservation;
use atelier_db::repositories::TokenWeightRepo;

use crate::error::EngineError;

/// Everything the composer needs to sample one category for one user.
#[derive(Debug, Clone, Default)]
pub struct CategoryWeights {
    /// The user's own posteriors, keyed by token value.
    pub user: HashMap<String, TokenPosterior>,
    /// Population posteriors for the same category.
    pub global: HashMap<String, TokenPosterior>,
    /// The user's total directional observations in this category.
    pub user_observations: u64,
}

impl CategoryWeights {
    /// The effective posterior for one token: the user's own when the
    /// category has enough history, otherwise blended with the population.
    pub fn effective(&self, token: &str, cold_start_floor: u64) -> TokenPosterior {
        let user = self
            .user
            .get(token)
            .cloned()
            .unwrap_or_else(TokenPosterior::uniform);
        let global = self
            .global
            .get(token)
            .cloned()
            .unwrap_or_else(TokenPosterior::uniform);
        blend_posteriors(&user, &global, self.user_observations, cold_start_floor)
    }
}

/// Persisted bandit posterior storage.
#[async_trait]
pub trait WeightStore: Send + Sync {
    /// Load user and population posteriors for one category.
    async fn load_category(
        &self,
        user_id: DbId,
        category: TokenCategory,
    ) -> Result<CategoryWeights, EngineError>;

    /// Record one success/failure observation for a token. Must be atomic
    /// under concurrent feedback.
    async fn record_outcome(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
        success: bool,
    ) -> Result<(), EngineError>;

    /// Mark a token as used by a composed prompt.
    async fn record_usage(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
    ) -> Result<(), EngineError>;
}

/// Postgres-backed weight store over the `token_weights` table.
pub struct PgWeightStore {
    pool: PgPool,
}

impl PgWeightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeightStore for PgWeightStore {
    async fn load_category(
        &self,
        user_id: DbId,
        category: TokenCategory,
    ) -> Result<CategoryWeights, EngineError> {
        let rows =
            TokenWeightRepo::get_for_user_category(&self.pool, user_id, category.as_str()).await?;
        let mut user = HashMap::with_capacity(rows.len());
        let mut observations = 0.0;
        for row in rows {
            let posterior = row.posterior();
            observations += posterior.observations();
            user.insert(row.token_value, posterior);
        }

        let mut global = HashMap::new();
        for row in TokenWeightRepo::get_global(&self.pool).await? {
            if row.category == category.as_str() {
                let posterior = row.posterior();
                global.insert(row.token_value, posterior);
            }
        }

        Ok(CategoryWeights {
            user,
            global,
            user_observations: observations as u64,
        })
    }

    async fn record_outcome(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
        success: bool,
    ) -> Result<(), EngineError> {
        TokenWeightRepo::record_observation(
            &self.pool,
            &RecordObservation {
                user_id,
                category: category.as_str().to_string(),
                token_value: token.to_string(),
                success,
            },
        )
        .await?;
        Ok(())
    }

    async fn record_usage(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
    ) -> Result<(), EngineError> {
        TokenWeightRepo::record_usage(&self.pool, user_id, category.as_str(), token).await?;
        Ok(())
    }
}
