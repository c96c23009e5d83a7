//! Repository for the `feedback_events` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::feedback::{CreateFeedbackEvent, FeedbackEvent, FeedbackTypeCount};

/// Column list for `feedback_events` SELECT queries.
const COLUMNS: &str =
    "id, generation_id, user_id, feedback_type, source, comment_text, created_at";

/// Provides query operations for feedback events.
pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Record a feedback event. Returns `None` when the same action was
    /// already recorded for this image; the unique constraint makes the
    /// write idempotent.
    pub async fn insert(
        pool: &PgPool,
        event: &CreateFeedbackEvent,
    ) -> Result<Option<FeedbackEvent>, sqlx::Error> {
        let query = format!(
            "INSERT INTO feedback_events \
                 (generation_id, user_id, feedback_type, source, comment_text) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (generation_id, feedback_type) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeedbackEvent>(&query)
            .bind(event.generation_id)
            .bind(event.user_id)
            .bind(&event.feedback_type)
            .bind(&event.source)
            .bind(&event.comment_text)
            .fetch_optional(pool)
            .await
    }

    /// All feedback for one generated image.
    pub async fn get_by_generation(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<Vec<FeedbackEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedback_events WHERE generation_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, FeedbackEvent>(&query)
            .bind(generation_id)
            .fetch_all(pool)
            .await
    }

    /// Per-type feedback counts across a user's history.
    pub async fn count_by_type(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<FeedbackTypeCount>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackTypeCount>(
            "SELECT feedback_type, COUNT(*) AS count FROM feedback_events \
             WHERE user_id = $1 GROUP BY feedback_type ORDER BY feedback_type",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
