//! Archived training examples from unselected candidates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{DbId, Timestamp};

/// One archived candidate kept as a preference-training example.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RlhfExample {
    pub id: DbId,
    pub generation_id: DbId,
    pub user_id: DbId,
    /// `negative` (low-scoring) or `neutral` (over capacity).
    pub disposition: String,
    pub positive_prompt: String,
    pub overall_score: f64,
    pub metadata_json: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for archiving an unselected candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRlhfExample {
    pub generation_id: DbId,
    pub user_id: DbId,
    pub disposition: String,
    pub positive_prompt: String,
    pub overall_score: f64,
    pub metadata_json: serde_json::Value,
}
