//! Candidate validation scoring and top-N selection.
//!
//! Re-derived attributes from the Visual Analyst are compared against the
//! target spec per attribute (exact / fuzzy-synonym / mismatch), aggregated
//! into a consistency score, combined with aesthetic alignment, and boosted
//! by the outlier signal.
//!
//! "Outlier" here is a positive standout signal: a design that exceeds the
//! user's established success baseline. It is never a reason to discard a
//! candidate.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Similarity credited to a fuzzy (synonym) attribute match.
pub const FUZZY_SIMILARITY: f64 = 0.7;

/// Candidates scoring below this overall floor are rejected.
pub const REJECTION_FLOOR: f64 = 40.0;

/// Candidates within this band above the floor are flagged for review.
pub const FLAG_BAND: f64 = 10.0;

/// Outlier score at or above which a candidate is marked a standout.
pub const OUTLIER_THRESHOLD: f64 = 25.0;

/// Weight of the outlier bonus folded into the overall score.
const OUTLIER_BONUS_WEIGHT: f64 = 0.05;

/// User success baseline assumed until validation history exists.
pub const DEFAULT_SUCCESS_BASELINE: f64 = 70.0;

/// Rejection reason: overall score below [`REJECTION_FLOOR`].
pub const REASON_LOW_SCORE: &str = "below_quality_floor";
/// Rejection reason: the target spec's policy terms were violated.
pub const REASON_POLICY: &str = "policy_violation";
/// Rejection reason: the Visual Analyst was unreachable.
pub const REASON_VALIDATION_UNAVAILABLE: &str = "validation_unavailable";

/// Synonym groups for fuzzy attribute matching. Values within one group are
/// interchangeable at [`FUZZY_SIMILARITY`] credit.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["navy", "dark blue", "midnight blue"],
    &["charcoal", "dark grey", "dark gray", "graphite"],
    &["ivory", "off-white", "cream"],
    &["camel", "tan", "beige"],
    &["burgundy", "wine", "oxblood"],
    &["silk", "satin", "charmeuse"],
    &["wool", "suiting", "flannel"],
    &["leather", "suede"],
    &["fitted", "tailored", "slim"],
    &["oversized", "loose", "relaxed"],
    &["draped", "flowing", "fluid"],
    &["minimalist", "clean", "understated"],
    &["romantic", "feminine", "soft"],
    &["avant-garde", "experimental", "deconstructed"],
];

// ---------------------------------------------------------------------------
// Attribute comparison
// ---------------------------------------------------------------------------

/// How a detected attribute related to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Mismatch,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::Mismatch => "mismatch",
        }
    }
}

/// One attribute's target-vs-detected comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeComparison {
    pub attribute_name: String,
    pub target_value: String,
    pub detected_value: String,
    pub similarity_score: f64,
    pub match_type: MatchType,
    pub is_match: bool,
}

/// Compare one attribute: exact match (case-insensitive) scores 1.0, a
/// synonym scores [`FUZZY_SIMILARITY`], anything else 0.0.
pub fn compare_attribute(name: &str, target: &str, detected: &str) -> AttributeComparison {
    let t = target.trim().to_lowercase();
    let d = detected.trim().to_lowercase();

    let (similarity, match_type) = if !t.is_empty() && t == d {
        (1.0, MatchType::Exact)
    } else if are_synonyms(&t, &d) {
        (FUZZY_SIMILARITY, MatchType::Fuzzy)
    } else {
        (0.0, MatchType::Mismatch)
    };

    AttributeComparison {
        attribute_name: name.to_string(),
        target_value: target.to_string(),
        detected_value: detected.to_string(),
        similarity_score: similarity,
        match_type,
        is_match: match_type != MatchType::Mismatch,
    }
}

fn are_synonyms(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    SYNONYM_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

// ---------------------------------------------------------------------------
// Aggregate scores
// ---------------------------------------------------------------------------

/// Mean attribute similarity scaled to `0..=100`. No comparisons means no
/// evidence of inconsistency; score 0 so empty results never pass the floor.
pub fn consistency_score(comparisons: &[AttributeComparison]) -> f64 {
    if comparisons.is_empty() {
        return 0.0;
    }
    let sum: f64 = comparisons.iter().map(|c| c.similarity_score).sum();
    sum / comparisons.len() as f64 * 100.0
}

/// Aesthetic alignment in `0..=100`: exact primary match 100, secondary
/// aesthetic 75, synonym of the primary 70, otherwise 30.
pub fn style_score(detected: &str, primary: &str, secondary: &[String]) -> f64 {
    let d = detected.trim().to_lowercase();
    let p = primary.trim().to_lowercase();
    if !p.is_empty() && d == p {
        return 100.0;
    }
    if secondary.iter().any(|s| s.trim().to_lowercase() == d) {
        return 75.0;
    }
    if are_synonyms(&d, &p) {
        return 70.0;
    }
    30.0
}

/// Positive standout signal in `0..=100`: how far the candidate's base
/// quality exceeds the user's success baseline, normalized to the remaining
/// headroom. At or below the baseline the score is 0.
pub fn outlier_score(base_score: f64, success_baseline: f64) -> f64 {
    let baseline = success_baseline.clamp(0.0, 99.0);
    if base_score <= baseline {
        return 0.0;
    }
    ((base_score - baseline) / (100.0 - baseline) * 100.0).clamp(0.0, 100.0)
}

/// The combined validation scores for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScores {
    pub overall_score: f64,
    pub consistency_score: f64,
    pub style_score: f64,
    pub outlier_score: f64,
    pub is_outlier: bool,
}

/// Combine the component scores.
///
/// Base quality is `0.6 * consistency + 0.4 * style`; the outlier signal
/// adds a small bonus on top (never a penalty), capped at 100.
pub fn combine_scores(consistency: f64, style: f64, success_baseline: f64) -> CandidateScores {
    let base = 0.6 * consistency + 0.4 * style;
    let outlier = outlier_score(base, success_baseline);
    CandidateScores {
        overall_score: (base + OUTLIER_BONUS_WEIGHT * outlier).min(100.0),
        consistency_score: consistency,
        style_score: style,
        outlier_score: outlier,
        is_outlier: outlier >= OUTLIER_THRESHOLD,
    }
}

// ---------------------------------------------------------------------------
// Decision policy
// ---------------------------------------------------------------------------

/// The accept/flag/reject outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum ValidationDecision {
    Accepted,
    Flagged,
    Rejected(String),
}

/// Apply the decision policy to an overall score.
///
/// Policy violations reject outright regardless of score. Below the hard
/// floor rejects; within [`FLAG_BAND`] above the floor flags; otherwise the
/// candidate is accepted. A high outlier score never causes rejection.
pub fn decide(overall_score: f64, policy_violation: bool) -> ValidationDecision {
    if policy_violation {
        return ValidationDecision::Rejected(REASON_POLICY.to_string());
    }
    if overall_score < REJECTION_FLOOR {
        return ValidationDecision::Rejected(REASON_LOW_SCORE.to_string());
    }
    if overall_score < REJECTION_FLOOR + FLAG_BAND {
        return ValidationDecision::Flagged;
    }
    ValidationDecision::Accepted
}

// ---------------------------------------------------------------------------
// Top-N selection
// ---------------------------------------------------------------------------

/// A validated candidate eligible for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub generation_id: DbId,
    pub overall_score: f64,
    pub created_at: Timestamp,
}

/// Disposition of a candidate that was validated but not returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlhfDisposition {
    /// Rejected or low-scoring: a negative training example.
    Negative,
    /// Acceptable quality, merely over capacity: a neutral example.
    Neutral,
}

/// Disposition for an unselected candidate based on its score.
pub fn rlhf_disposition(overall_score: f64) -> RlhfDisposition {
    if overall_score < REJECTION_FLOOR {
        RlhfDisposition::Negative
    } else {
        RlhfDisposition::Neutral
    }
}

/// Order candidates by `overall_score` descending (ties broken by earlier
/// `created_at`) and split off the first `n`.
///
/// Returns `(selected, remainder)`; the remainder keeps the same ordering
/// so callers can archive it as training examples.
pub fn select_top(
    mut candidates: Vec<RankedCandidate>,
    n: usize,
) -> (Vec<RankedCandidate>, Vec<RankedCandidate>) {
    candidates.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    let remainder = candidates.split_off(n.min(candidates.len()));
    (candidates, remainder)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
