//! Versioned style profile snapshots.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{DbId, Timestamp};

/// One immutable style profile version for a user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StyleProfileRow {
    pub id: DbId,
    pub user_id: DbId,
    pub version: i32,
    pub images_analyzed: i32,
    pub overall_confidence: f64,
    /// Serialized `atelier_core::profile::StyleProfile`.
    pub profile_json: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for inserting a new profile version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStyleProfile {
    pub user_id: DbId,
    pub images_analyzed: i32,
    pub overall_confidence: f64,
    pub profile_json: serde_json::Value,
}
