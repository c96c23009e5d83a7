//! Per-user Beta posterior rows backing the token bandit.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::bandit::TokenPosterior;
use atelier_core::types::{DbId, Timestamp};

/// One `(user, category, token)` posterior row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TokenWeight {
    pub id: DbId,
    pub user_id: DbId,
    pub category: String,
    pub token_value: String,
    pub alpha: f64,
    pub beta: f64,
    /// How many composed prompts have used this token.
    pub times_used: i64,
    pub updated_at: Timestamp,
}

impl TokenWeight {
    pub fn posterior(&self) -> TokenPosterior {
        TokenPosterior::new(self.alpha, self.beta)
    }
}

/// Aggregated cross-user evidence for one `(category, token)` pair.
///
/// The global posterior pools all users' observations on top of the
/// uniform prior.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlobalTokenWeight {
    pub category: String,
    pub token_value: String,
    pub successes: f64,
    pub failures: f64,
}

impl GlobalTokenWeight {
    pub fn posterior(&self) -> TokenPosterior {
        TokenPosterior::new(1.0 + self.successes, 1.0 + self.failures)
    }
}

/// DTO for recording one observation against a token.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordObservation {
    pub user_id: DbId,
    pub category: String,
    pub token_value: String,
    pub success: bool,
}
