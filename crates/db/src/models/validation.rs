//! Validation result entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{DbId, Timestamp};

/// Scores and decision recorded for one validated candidate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ValidationResultRow {
    pub id: DbId,
    pub generation_id: DbId,
    pub consistency_score: f64,
    pub style_score: f64,
    pub outlier_score: f64,
    pub overall_score: f64,
    pub is_outlier: bool,
    pub decision: String,
    pub rejection_reason: Option<String>,
    /// Serialized `Vec<atelier_core::scoring::AttributeComparison>`.
    pub comparisons_json: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for inserting a validation result.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateValidationResult {
    pub generation_id: DbId,
    pub consistency_score: f64,
    pub style_score: f64,
    pub outlier_score: f64,
    pub overall_score: f64,
    pub is_outlier: bool,
    pub decision: String,
    pub rejection_reason: Option<String>,
    pub comparisons_json: serde_json::Value,
}
