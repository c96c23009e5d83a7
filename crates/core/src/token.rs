//! Creative token categories and the default token catalog.
//!
//! A token is one creative choice within a category ("navy" in `color`,
//! "bias cut" in `construction`). The bandit learns per-(user, category,
//! token) success weights; the composer samples exactly one token per
//! category for every prompt it assembles.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// TokenCategory
// ---------------------------------------------------------------------------

/// The fixed set of creative token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Color,
    Fabric,
    Silhouette,
    Construction,
    ModelCharacteristics,
    Photography,
}

/// All categories, in the order tokens appear in an assembled prompt.
pub const ALL_CATEGORIES: &[TokenCategory] = &[
    TokenCategory::Color,
    TokenCategory::Fabric,
    TokenCategory::Silhouette,
    TokenCategory::Construction,
    TokenCategory::ModelCharacteristics,
    TokenCategory::Photography,
];

impl TokenCategory {
    /// Stable string form, used as the database key and in metadata JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Color => "color",
            TokenCategory::Fabric => "fabric",
            TokenCategory::Silhouette => "silhouette",
            TokenCategory::Construction => "construction",
            TokenCategory::ModelCharacteristics => "model_characteristics",
            TokenCategory::Photography => "photography",
        }
    }

    /// Parse the stable string form back into a category.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "color" => Ok(TokenCategory::Color),
            "fabric" => Ok(TokenCategory::Fabric),
            "silhouette" => Ok(TokenCategory::Silhouette),
            "construction" => Ok(TokenCategory::Construction),
            "model_characteristics" => Ok(TokenCategory::ModelCharacteristics),
            "photography" => Ok(TokenCategory::Photography),
            other => Err(CoreError::Validation(format!(
                "Unknown token category '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Default token catalog
// ---------------------------------------------------------------------------

/// Default color tokens.
pub const DEFAULT_COLORS: &[&str] = &[
    "black", "white", "navy", "ivory", "charcoal", "camel", "burgundy", "sage",
];

/// Default fabric tokens.
pub const DEFAULT_FABRICS: &[&str] = &[
    "silk", "wool", "cotton", "linen", "leather", "chiffon", "denim",
];

/// Default silhouette tokens.
pub const DEFAULT_SILHOUETTES: &[&str] = &[
    "a-line", "fitted", "oversized", "draped", "structured", "asymmetric",
];

/// Default construction tokens.
pub const DEFAULT_CONSTRUCTION: &[&str] = &[
    "tailored seams",
    "raw hem",
    "bias cut",
    "pleated",
    "hand-stitched detailing",
    "deconstructed",
];

/// Default model characteristic tokens.
pub const DEFAULT_MODEL_CHARACTERISTICS: &[&str] = &[
    "editorial pose",
    "relaxed stance",
    "walking motion",
    "three-quarter turn",
];

/// Default photography tokens.
pub const DEFAULT_PHOTOGRAPHY: &[&str] = &[
    "studio lighting",
    "natural light",
    "full-body shot",
    "golden hour",
    "high-key lighting",
];

/// The default candidate tokens for a category.
///
/// Callers may extend or replace these per request; the bandit simply learns
/// weights for whatever candidates it is offered.
pub fn default_candidates(category: TokenCategory) -> &'static [&'static str] {
    match category {
        TokenCategory::Color => DEFAULT_COLORS,
        TokenCategory::Fabric => DEFAULT_FABRICS,
        TokenCategory::Silhouette => DEFAULT_SILHOUETTES,
        TokenCategory::Construction => DEFAULT_CONSTRUCTION,
        TokenCategory::ModelCharacteristics => DEFAULT_MODEL_CHARACTERISTICS,
        TokenCategory::Photography => DEFAULT_PHOTOGRAPHY,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
