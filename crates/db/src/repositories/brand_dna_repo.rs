//! Repository for the `brand_dna` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::brand_dna::{BrandDnaRow, UpsertBrandDna};

/// Column list for `brand_dna` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, primary_aesthetic, secondary_aesthetics_json, \
    signature_colors_json, signature_fabrics_json, signature_construction_json, \
    photography_json, aesthetic_confidence, overall_confidence, drift_score, \
    updated_at";

/// Provides query operations for extracted brand DNA (one row per user).
pub struct BrandDnaRepo;

impl BrandDnaRepo {
    /// Insert or replace a user's brand DNA.
    pub async fn upsert(pool: &PgPool, dna: &UpsertBrandDna) -> Result<BrandDnaRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO brand_dna \
                 (user_id, primary_aesthetic, secondary_aesthetics_json, \
                  signature_colors_json, signature_fabrics_json, \
                  signature_construction_json, photography_json, \
                  aesthetic_confidence, overall_confidence, drift_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 primary_aesthetic = EXCLUDED.primary_aesthetic, \
                 secondary_aesthetics_json = EXCLUDED.secondary_aesthetics_json, \
                 signature_colors_json = EXCLUDED.signature_colors_json, \
                 signature_fabrics_json = EXCLUDED.signature_fabrics_json, \
                 signature_construction_json = EXCLUDED.signature_construction_json, \
                 photography_json = EXCLUDED.photography_json, \
                 aesthetic_confidence = EXCLUDED.aesthetic_confidence, \
                 overall_confidence = EXCLUDED.overall_confidence, \
                 drift_score = EXCLUDED.drift_score, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandDnaRow>(&query)
            .bind(dna.user_id)
            .bind(&dna.primary_aesthetic)
            .bind(&dna.secondary_aesthetics_json)
            .bind(&dna.signature_colors_json)
            .bind(&dna.signature_fabrics_json)
            .bind(&dna.signature_construction_json)
            .bind(&dna.photography_json)
            .bind(dna.aesthetic_confidence)
            .bind(dna.overall_confidence)
            .bind(dna.drift_score)
            .fetch_one(pool)
            .await
    }

    /// A user's current brand DNA, if extracted.
    pub async fn get_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<BrandDnaRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brand_dna WHERE user_id = $1");
        sqlx::query_as::<_, BrandDnaRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
