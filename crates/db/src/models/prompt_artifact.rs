//! Composed prompt artifacts stored per generated image.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use atelier_core::types::{DbId, Timestamp};

/// An assembled prompt plus the metadata needed to audit and learn from it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptArtifact {
    pub id: DbId,
    pub batch_id: Uuid,
    pub user_id: DbId,
    pub builder_variant: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    /// Serialized `atelier_core::prompt::PromptMetadata`.
    pub metadata_json: serde_json::Value,
    /// Sorted token-combination fingerprint used for diversity checks.
    pub combination_key: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a composed prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromptArtifact {
    pub batch_id: Uuid,
    pub user_id: DbId,
    pub builder_variant: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub metadata_json: serde_json::Value,
    pub combination_key: String,
}
