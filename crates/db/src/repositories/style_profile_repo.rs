//! Repository for the `style_profiles` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::style_profile::{CreateStyleProfile, StyleProfileRow};

/// Column list for `style_profiles` SELECT queries.
const COLUMNS: &str =
    "id, user_id, version, images_analyzed, overall_confidence, profile_json, created_at";

/// Provides query operations for versioned style profiles.
pub struct StyleProfileRepo;

impl StyleProfileRepo {
    /// Insert the next profile version for a user. Versions are assigned
    /// inside the statement so concurrent inserts cannot collide silently;
    /// the unique constraint catches the race.
    pub async fn insert(
        pool: &PgPool,
        profile: &CreateStyleProfile,
    ) -> Result<StyleProfileRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO style_profiles \
                 (user_id, version, images_analyzed, overall_confidence, profile_json) \
             VALUES ($1, \
                 (SELECT COALESCE(MAX(version), 0) + 1 FROM style_profiles WHERE user_id = $1), \
                 $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StyleProfileRow>(&query)
            .bind(profile.user_id)
            .bind(profile.images_analyzed)
            .bind(profile.overall_confidence)
            .bind(&profile.profile_json)
            .fetch_one(pool)
            .await
    }

    /// Latest profile version for a user.
    pub async fn get_latest(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StyleProfileRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM style_profiles \
             WHERE user_id = $1 ORDER BY version DESC LIMIT 1"
        );
        sqlx::query_as::<_, StyleProfileRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// A specific profile version.
    pub async fn get_version(
        pool: &PgPool,
        user_id: DbId,
        version: i32,
    ) -> Result<Option<StyleProfileRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM style_profiles WHERE user_id = $1 AND version = $2"
        );
        sqlx::query_as::<_, StyleProfileRow>(&query)
            .bind(user_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }
}
