//! Brand DNA entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::brand_dna::{BrandDna, PhotographyPreferences};
use atelier_core::types::{DbId, Timestamp};

/// Current extracted brand DNA for a user (one row per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BrandDnaRow {
    pub id: DbId,
    pub user_id: DbId,
    pub primary_aesthetic: String,
    pub secondary_aesthetics_json: serde_json::Value,
    pub signature_colors_json: serde_json::Value,
    pub signature_fabrics_json: serde_json::Value,
    pub signature_construction_json: serde_json::Value,
    pub photography_json: serde_json::Value,
    pub aesthetic_confidence: f64,
    pub overall_confidence: f64,
    pub drift_score: Option<f64>,
    pub updated_at: Timestamp,
}

impl BrandDnaRow {
    /// Deserialize the row back into the domain structure.
    pub fn to_domain(&self) -> Result<BrandDna, serde_json::Error> {
        Ok(BrandDna {
            user_id: self.user_id,
            primary_aesthetic: self.primary_aesthetic.clone(),
            secondary_aesthetics: serde_json::from_value(self.secondary_aesthetics_json.clone())?,
            signature_colors: serde_json::from_value(self.signature_colors_json.clone())?,
            signature_fabrics: serde_json::from_value(self.signature_fabrics_json.clone())?,
            signature_construction: serde_json::from_value(
                self.signature_construction_json.clone(),
            )?,
            preferred_photography: serde_json::from_value::<PhotographyPreferences>(
                self.photography_json.clone(),
            )?,
            aesthetic_confidence: self.aesthetic_confidence,
            overall_confidence: self.overall_confidence,
            drift_score: self.drift_score.unwrap_or(0.0),
            last_updated: self.updated_at,
        })
    }
}

/// DTO for upserting a user's brand DNA.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBrandDna {
    pub user_id: DbId,
    pub primary_aesthetic: String,
    pub secondary_aesthetics_json: serde_json::Value,
    pub signature_colors_json: serde_json::Value,
    pub signature_fabrics_json: serde_json::Value,
    pub signature_construction_json: serde_json::Value,
    pub photography_json: serde_json::Value,
    pub aesthetic_confidence: f64,
    pub overall_confidence: f64,
    pub drift_score: Option<f64>,
}

impl UpsertBrandDna {
    /// Serialize a domain extraction for persistence.
    pub fn from_domain(dna: &BrandDna) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: dna.user_id,
            primary_aesthetic: dna.primary_aesthetic.clone(),
            secondary_aesthetics_json: serde_json::to_value(&dna.secondary_aesthetics)?,
            signature_colors_json: serde_json::to_value(&dna.signature_colors)?,
            signature_fabrics_json: serde_json::to_value(&dna.signature_fabrics)?,
            signature_construction_json: serde_json::to_value(&dna.signature_construction)?,
            photography_json: serde_json::to_value(&dna.preferred_photography)?,
            aesthetic_confidence: dna.aesthetic_confidence,
            overall_confidence: dna.overall_confidence,
            drift_score: Some(dna.drift_score),
        })
    }
}
