//! Generation candidate entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use atelier_core::error::CoreError;
use atelier_core::types::{DbId, Timestamp};

/// Lifecycle of one generated candidate image.
///
/// `pending` moves to exactly one of `completed` or `failed`; both are
/// terminal. A retry is issued as a new candidate, never by reusing a
/// failed row. Selection and archiving are tracked by the validation
/// result and RLHF tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Queued for the generation provider.
    Pending,
    /// Image produced and stored.
    Completed,
    /// Provider call failed.
    Failed,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Completed => "completed",
            CandidateStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(CandidateStatus::Pending),
            "completed" => Ok(CandidateStatus::Completed),
            "failed" => Ok(CandidateStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "unknown candidate status: {other}"
            ))),
        }
    }
}

/// One candidate image in an over-generation batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationCandidate {
    pub id: DbId,
    pub batch_id: Uuid,
    pub user_id: DbId,
    pub prompt_artifact_id: DbId,
    pub status: String,
    pub image_url: Option<String>,
    pub storage_key: Option<String>,
    pub provider: Option<String>,
    pub cost_cents: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a pending candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCandidate {
    pub batch_id: Uuid,
    pub user_id: DbId,
    pub prompt_artifact_id: DbId,
}

/// DTO recording a successful provider call.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateResult {
    pub image_url: String,
    pub storage_key: String,
    pub provider: String,
    pub cost_cents: i64,
}

/// Per-status counts for a batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchStatusCount {
    pub status: String,
    pub count: i64,
}
