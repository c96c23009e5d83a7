//! Validation engine: re-derives attributes per candidate, scores them
//! against the target spec, and selects the top-N to return.

use std::sync::Arc;

use atelier_core::profile::GarmentAttributes;
use atelier_core::prompt::SelectedToken;
use atelier_core::scoring::{
    combine_scores, compare_attribute, consistency_score, decide, rlhf_disposition, style_score,
    AttributeComparison, CandidateScores, RlhfDisposition, ValidationDecision,
    REASON_VALIDATION_UNAVAILABLE,
};
use atelier_core::token::TokenCategory;
use atelier_core::types::{DbId, Timestamp};
use atelier_provider::VisualAnalyst;

use crate::config::EngineConfig;

/// Neutral style score used when no target aesthetic exists to compare
/// against.
const NEUTRAL_STYLE_SCORE: f64 = 70.0;

/// What the batch asked the image to be.
#[derive(Debug, Clone)]
pub struct ValidationTarget {
    pub garment_type: String,
    pub tokens: Vec<SelectedToken>,
    pub primary_aesthetic: Option<String>,
    pub secondary_aesthetics: Vec<String>,
}

/// One completed candidate awaiting validation.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub generation_id: DbId,
    pub image_url: String,
    pub created_at: Timestamp,
}

/// The validation outcome for one candidate.
#[derive(Debug, Clone)]
pub struct CandidateValidation {
    pub generation_id: DbId,
    pub created_at: Timestamp,
    pub scores: CandidateScores,
    pub decision: ValidationDecision,
    pub comparisons: Vec<AttributeComparison>,
}

impl CandidateValidation {
    /// Rejected candidates are never returned to the caller.
    pub fn returnable(&self) -> bool {
        !matches!(self.decision, ValidationDecision::Rejected(_))
    }
}

/// The split produced by top-N selection.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Best candidates, ordered by overall score descending.
    pub selected: Vec<CandidateValidation>,
    /// Everything else, paired with its training-example disposition.
    pub archived: Vec<(CandidateValidation, RlhfDisposition)>,
}

/// Scores candidates against their target spec via the Visual Analyst.
pub struct Validator {
    analyst: Arc<dyn VisualAnalyst>,
    config: EngineConfig,
}

impl Validator {
    pub fn new(analyst: Arc<dyn VisualAnalyst>, config: EngineConfig) -> Self {
        Self { analyst, config }
    }

    /// Validate one candidate.
    ///
    /// An unreachable analyst rejects the candidate with the
    /// `validation_unavailable` reason; a candidate is never silently
    /// accepted without being analyzed.
    pub async fn validate_candidate(
        &self,
        record: &CandidateRecord,
        target: &ValidationTarget,
        success_baseline: f64,
    ) -> CandidateValidation {
        let attributes = match self.analyst.analyze(&record.image_url).await {
            Ok(attributes) => attributes,
            Err(e) => {
                tracing::warn!(
                    generation_id = record.generation_id,
                    error = %e,
                    "visual analyst unavailable, rejecting candidate"
                );
                return CandidateValidation {
                    generation_id: record.generation_id,
                    created_at: record.created_at,
                    scores: combine_scores(0.0, 0.0, success_baseline),
                    decision: ValidationDecision::Rejected(
                        REASON_VALIDATION_UNAVAILABLE.to_string(),
                    ),
                    comparisons: Vec::new(),
                };
            }
        };

        let comparisons = compare_against_target(target, &attributes);
        let consistency = consistency_score(&comparisons);
        let style = match &target.primary_aesthetic {
            Some(primary) => style_score(
                &attributes.style_aesthetic,
                primary,
                &target.secondary_aesthetics,
            ),
            None => NEUTRAL_STYLE_SCORE,
        };

        let scores = combine_scores(consistency, style, success_baseline);
        let decision = decide(scores.overall_score, false);

        CandidateValidation {
            generation_id: record.generation_id,
            created_at: record.created_at,
            scores,
            decision,
            comparisons,
        }
    }

    /// Validate every candidate in a batch.
    pub async fn validate_batch(
        &self,
        records: &[CandidateRecord],
        target: &ValidationTarget,
        success_baseline: f64,
    ) -> Vec<CandidateValidation> {
        let mut validations = Vec::with_capacity(records.len());
        for record in records {
            validations.push(
                self.validate_candidate(record, target, success_baseline)
                    .await,
            );
        }
        validations
    }

    /// Whether a validation score earns an implicit positive signal.
    pub fn auto_positive(&self, validation: &CandidateValidation) -> bool {
        validation.scores.overall_score >= self.config.auto_positive_threshold
    }
}

/// Split validated candidates into the returned top-N and the archive.
///
/// Rejected candidates are excluded from selection outright — the result
/// is never padded with them. The remainder is ordered the same way and
/// tagged negative (rejected) or neutral (merely over capacity).
pub fn select_top(validations: Vec<CandidateValidation>, n: usize) -> SelectionOutcome {
    let (mut returnable, rejected): (Vec<_>, Vec<_>) =
        validations.into_iter().partition(|v| v.returnable());

    returnable.sort_by(|a, b| {
        b.scores
            .overall_score
            .partial_cmp(&a.scores.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let overflow = returnable.split_off(n.min(returnable.len()));
    let mut archived: Vec<(CandidateValidation, RlhfDisposition)> = overflow
        .into_iter()
        .map(|v| {
            let disposition = rlhf_disposition(v.scores.overall_score);
            (v, disposition)
        })
        .collect();
    archived.extend(
        rejected
            .into_iter()
            .map(|v| (v, RlhfDisposition::Negative)),
    );

    SelectionOutcome {
        selected: returnable,
        archived,
    }
}

/// Compare each target attribute against the closest detected value.
fn compare_against_target(
    target: &ValidationTarget,
    attributes: &GarmentAttributes,
) -> Vec<AttributeComparison> {
    let mut comparisons = vec![best_comparison(
        "garment_type",
        &target.garment_type,
        std::slice::from_ref(&attributes.garment_type),
    )];

    for token in &target.tokens {
        let detected: &[String] = match token.category {
            TokenCategory::Color => &attributes.colors,
            TokenCategory::Fabric => &attributes.fabrics,
            TokenCategory::Construction => &attributes.construction,
            // Silhouette, model, and photography attributes are not
            // re-derived by the analyst; they carry no comparison.
            _ => continue,
        };
        comparisons.push(best_comparison(token.category.as_str(), &token.value, detected));
    }

    comparisons
}

/// The highest-similarity comparison between a target value and any of the
/// detected values for that attribute.
fn best_comparison(name: &str, target: &str, detected: &[String]) -> AttributeComparison {
    let Some(first) = detected.first() else {
        return compare_attribute(name, target, "");
    };
    let mut best = compare_attribute(name, target, first);
    for value in &detected[1..] {
        let comparison = compare_attribute(name, target, value);
        if comparison.similarity_score > best.similarity_score {
            best = comparison;
        }
    }
    best
}
