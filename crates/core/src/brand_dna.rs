//! Brand DNA extraction and enforcement.
//!
//! Brand DNA is the distilled set of signature aesthetic, color, fabric,
//! construction, and photography descriptors representative of a designer's
//! portfolio. Extraction is a deterministic projection of the style profile;
//! enforcement biases token selection toward the signatures without ever
//! removing candidates outright.

use serde::{Deserialize, Serialize};

use crate::profile::{AttributeStat, StyleProfile};
use crate::token::TokenCategory;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Signature values kept per category.
pub const DEFAULT_SIGNATURE_COUNT: usize = 3;

/// Profiles below this overall confidence do not drive enforcement.
pub const MIN_ENFORCEMENT_CONFIDENCE: f64 = 0.3;

/// Default enforcement strength when the caller does not specify one.
pub const DEFAULT_ENFORCEMENT_STRENGTH: f64 = 0.7;

// ---------------------------------------------------------------------------
// BrandDna
// ---------------------------------------------------------------------------

/// Photography signatures, split into the three axes the composer uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotographyPreferences {
    pub shot_types: Vec<String>,
    pub lighting: Vec<String>,
    pub angles: Vec<String>,
}

/// The distilled brand signature for one designer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDna {
    pub user_id: DbId,
    pub primary_aesthetic: String,
    pub secondary_aesthetics: Vec<String>,
    pub signature_colors: Vec<String>,
    pub signature_fabrics: Vec<String>,
    pub signature_construction: Vec<String>,
    pub preferred_photography: PhotographyPreferences,
    /// Confidence in the aesthetic classification specifically.
    pub aesthetic_confidence: f64,
    /// Overall profile confidence carried over from the style profile.
    pub overall_confidence: f64,
    /// How far this extraction drifted from the previous one (0 = identical).
    pub drift_score: f64,
    pub last_updated: Timestamp,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Project a style profile into Brand DNA.
///
/// Signature values per category are the top `signature_count` entries
/// ranked by `frequency * confidence`. The previous extraction, when
/// supplied, yields a drift score; a first extraction has drift 0.
pub fn extract_brand_dna(
    profile: &StyleProfile,
    signature_count: usize,
    previous: Option<&BrandDna>,
    now: Timestamp,
) -> BrandDna {
    let mut aesthetics = top_values(&profile.aesthetics, signature_count);
    let primary_aesthetic = if aesthetics.is_empty() {
        String::new()
    } else {
        aesthetics.remove(0)
    };

    let mut dna = BrandDna {
        user_id: profile.user_id,
        primary_aesthetic,
        secondary_aesthetics: aesthetics,
        signature_colors: top_values(&profile.colors, signature_count),
        signature_fabrics: top_values(&profile.fabrics, signature_count),
        signature_construction: top_values(&profile.construction, signature_count),
        preferred_photography: PhotographyPreferences {
            shot_types: top_values(&profile.shot_types, signature_count),
            lighting: top_values(&profile.lighting, signature_count),
            angles: top_values(&profile.angles, signature_count),
        },
        aesthetic_confidence: profile.aesthetics.first().map(|s| s.confidence).unwrap_or(0.0),
        overall_confidence: profile.overall_confidence,
        drift_score: 0.0,
        last_updated: now,
    };

    if let Some(prev) = previous {
        dna.drift_score = compute_drift(&dna, prev);
    }
    dna
}

/// Top-k attribute values by rank weight. Input is already sorted by the
/// profile aggregation, but re-sorting keeps this safe for hand-built
/// profiles.
fn top_values(stats: &[AttributeStat], k: usize) -> Vec<String> {
    let mut sorted: Vec<&AttributeStat> = stats.iter().collect();
    sorted.sort_by(|a, b| {
        b.rank_weight()
            .partial_cmp(&a.rank_weight())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.into_iter().take(k).map(|s| s.value.clone()).collect()
}

/// Signature-set drift between two extractions: one minus the Jaccard
/// overlap of the combined color/fabric/construction/aesthetic signatures.
pub fn compute_drift(current: &BrandDna, previous: &BrandDna) -> f64 {
    use std::collections::HashSet;

    let collect = |dna: &BrandDna| -> HashSet<String> {
        let mut set = HashSet::new();
        set.insert(dna.primary_aesthetic.clone());
        set.extend(dna.secondary_aesthetics.iter().cloned());
        set.extend(dna.signature_colors.iter().cloned());
        set.extend(dna.signature_fabrics.iter().cloned());
        set.extend(dna.signature_construction.iter().cloned());
        set.remove("");
        set
    };

    let a = collect(current);
    let b = collect(previous);
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    1.0 - intersection / union
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Whether Brand DNA enforcement can run at all.
///
/// Missing or low-confidence DNA silently disables enforcement; the request
/// proceeds unenforced and the response metadata records the fact.
pub fn enforcement_enabled(dna: Option<&BrandDna>) -> bool {
    dna.is_some_and(|d| d.overall_confidence >= MIN_ENFORCEMENT_CONFIDENCE)
}

/// The signature set Brand DNA contributes for a token category.
///
/// Silhouette and model characteristics carry no brand signature; their
/// slices are empty and every candidate weighs 1.0.
pub fn signatures_for(dna: &BrandDna, category: TokenCategory) -> &[String] {
    match category {
        TokenCategory::Color => &dna.signature_colors,
        TokenCategory::Fabric => &dna.signature_fabrics,
        TokenCategory::Construction => &dna.signature_construction,
        TokenCategory::Photography => &dna.preferred_photography.shot_types,
        TokenCategory::Silhouette | TokenCategory::ModelCharacteristics => &[],
    }
}

/// Selection weight multiplier for one candidate token.
///
/// Signature tokens keep weight 1.0; non-signature tokens are scaled down by
/// `1 - strength`. At strength 0.9 non-signatures are nearly excluded; at
/// 0.3 they remain broadly explorable. An empty signature set weighs
/// everything equally.
pub fn enforcement_weight(token: &str, signatures: &[String], strength: f64) -> f64 {
    if signatures.is_empty() {
        return 1.0;
    }
    let strength = strength.clamp(0.0, 1.0);
    if signatures.iter().any(|s| s.eq_ignore_ascii_case(token)) {
        1.0
    } else {
        1.0 - strength
    }
}

/// Fraction of selected tokens that landed inside their category's
/// signature set, in `0.0..=1.0`. Categories with no signatures are skipped.
pub fn brand_consistency_score(
    selected: &[(TokenCategory, String)],
    dna: &BrandDna,
) -> f64 {
    let mut considered = 0u32;
    let mut hits = 0u32;
    for (category, token) in selected {
        let signatures = signatures_for(dna, *category);
        if signatures.is_empty() {
            continue;
        }
        considered += 1;
        if signatures.iter().any(|s| s.eq_ignore_ascii_case(token)) {
            hits += 1;
        }
    }
    if considered == 0 {
        return 0.0;
    }
    hits as f64 / considered as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
