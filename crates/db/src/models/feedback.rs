//! Feedback event entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{DbId, Timestamp};

/// One recorded feedback action against a generated image.
///
/// The `(generation_id, feedback_type)` pair is unique, making repeated
/// submissions of the same action idempotent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackEvent {
    pub id: DbId,
    pub generation_id: DbId,
    pub user_id: DbId,
    pub feedback_type: String,
    /// `explicit` or `validation_auto`.
    pub source: String,
    pub comment_text: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording feedback.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedbackEvent {
    pub generation_id: DbId,
    pub user_id: DbId,
    pub feedback_type: String,
    pub source: String,
    pub comment_text: Option<String>,
}

/// Per-type feedback counts for a user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackTypeCount {
    pub feedback_type: String,
    pub count: i64,
}
