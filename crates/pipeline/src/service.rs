//! The engine's entry points: generation, feedback, and profile refresh.
//!
//! [`GenerationService`] wires composer, orchestrator, validator, and
//! learner together over Postgres and publishes progress events along
//! the way.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_core::brand_dna::{extract_brand_dna, BrandDna, DEFAULT_SIGNATURE_COUNT};
use atelier_core::overgen::{generate_count, shortfall};
use atelier_core::profile::{build_style_profile, GarmentAttributes};
use atelier_core::scoring::{RlhfDisposition, ValidationDecision, DEFAULT_SUCCESS_BASELINE};
use atelier_core::types::DbId;
use atelier_core::CoreError;
use atelier_db::models::brand_dna::UpsertBrandDna;
use atelier_db::models::generation::{CandidateResult, CreateCandidate};
use atelier_db::models::prompt_artifact::{CreatePromptArtifact, PromptArtifact};
use atelier_db::models::rlhf::CreateRlhfExample;
use atelier_db::models::style_profile::CreateStyleProfile;
use atelier_db::models::validation::CreateValidationResult;
use atelier_db::repositories::{
    BrandDnaRepo, GenerationRepo, PromptArtifactRepo, RlhfRepo, StyleProfileRepo, ValidationRepo,
};
use atelier_events::bus::event_types;
use atelier_events::{EventBus, PipelineEvent};
use atelier_provider::{GenerationProvider, ObjectStorage, VisualAnalyst};

use crate::composer::{ComposedPrompt, GenerationSpec, PromptComposer};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::learner::{FeedbackLearner, FeedbackOutcome, FeedbackRequest};
use crate::orchestrator::Orchestrator;
use crate::store::{PgWeightStore, WeightStore};
use crate::validator::{select_top, CandidateRecord, CandidateValidation, ValidationTarget, Validator};

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// How strongly user free-text steers the assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Sampled tokens lead; modifiers trail.
    Balanced,
    /// The user's own words lead the prompt.
    HighSpecificity,
}

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub user_id: DbId,
    pub garment_type: String,
    /// Free-text modifiers.
    pub prompt_text: Option<String>,
    pub mode: GenerationMode,
    pub quantity: u32,
    pub enforce_brand_dna: bool,
    /// Enforcement strength; the configured default applies when absent.
    pub brand_dna_strength: Option<f64>,
    /// Per-image variant assignment instead of batch-sticky routing.
    pub explore: bool,
    /// Fixed seed for reproducible batches; random when absent.
    pub seed: Option<u64>,
}

/// One returned candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub generation_id: DbId,
    pub image_url: String,
    pub overall_score: f64,
    pub consistency_score: f64,
    pub style_score: f64,
    pub outlier_score: f64,
    pub is_outlier: bool,
    pub flagged: bool,
}

/// The outcome of one generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub batch_id: Uuid,
    /// Selected candidates, best first. May be shorter than `quantity`.
    pub candidates: Vec<CandidateSummary>,
    pub artifacts: Vec<PromptArtifact>,
    /// How many requested images could not be delivered.
    pub shortfall: u32,
    pub generated_count: u32,
    pub failed_count: u32,
    pub total_cost_cents: i64,
    /// True when enforcement was requested but silently disabled.
    pub enforcement_disabled: bool,
    pub timed_out: bool,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The adaptive generation engine.
pub struct GenerationService {
    pool: PgPool,
    composer: PromptComposer,
    orchestrator: Orchestrator,
    validator: Validator,
    learner: FeedbackLearner,
    bus: Arc<EventBus>,
    config: EngineConfig,
}

impl GenerationService {
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn GenerationProvider>,
        analyst: Arc<dyn VisualAnalyst>,
        storage: Arc<dyn ObjectStorage>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        let store: Arc<dyn WeightStore> = Arc::new(PgWeightStore::new(pool.clone()));
        Self {
            composer: PromptComposer::new(store.clone(), config.clone()),
            orchestrator: Orchestrator::new(provider, storage, bus.clone(), config.clone()),
            validator: Validator::new(analyst, config.clone()),
            learner: FeedbackLearner::new(pool.clone(), store, bus.clone()),
            pool,
            bus,
            config,
        }
    }

    /// Generate a batch: compose, over-generate, validate, select.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, EngineError> {
        if request.quantity == 0 {
            return Err(EngineError::validation("quantity must be at least 1"));
        }
        if request.garment_type.trim().is_empty() {
            return Err(EngineError::validation("garment_type must not be empty"));
        }
        if let Some(strength) = request.brand_dna_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(EngineError::validation(
                    "brand_dna_strength must be within 0.0..=1.0",
                ));
            }
        }

        let batch_id = Uuid::new_v4();
        let base_seed = request.seed.unwrap_or_else(rand::random);
        let strength = request
            .brand_dna_strength
            .unwrap_or(self.config.default_enforcement_strength);

        let dna = self.load_brand_dna(request.user_id).await?;

        let spec = GenerationSpec {
            garment_type: request.garment_type.trim().to_string(),
            modifiers: request
                .prompt_text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            high_specificity: request.mode == GenerationMode::HighSpecificity,
        };

        let count = generate_count(request.quantity, self.config.buffer_percent)
            .min(self.config.max_generate_count);
        let composed = self
            .composer
            .compose_batch(
                request.user_id,
                batch_id,
                &spec,
                dna.as_ref(),
                request.enforce_brand_dna,
                strength,
                request.explore,
                count,
                base_seed,
            )
            .await?;
        let enforcement_disabled = composed
            .first()
            .is_some_and(|p| p.metadata.enforcement_disabled);

        // Persist artifacts and pending candidates before any provider call;
        // artifacts are immutable, so a crashed batch leaves only orphans.
        let mut artifacts = Vec::with_capacity(composed.len());
        let mut candidate_ids = Vec::with_capacity(composed.len());
        for prompt in &composed {
            let artifact = PromptArtifactRepo::insert(
                &self.pool,
                &CreatePromptArtifact {
                    batch_id,
                    user_id: request.user_id,
                    builder_variant: prompt.variant.as_str().to_string(),
                    positive_prompt: prompt.prompt.positive.clone(),
                    negative_prompt: prompt.prompt.negative.clone(),
                    seed: prompt.seed as i64,
                    metadata_json: serde_json::to_value(&prompt.metadata).map_err(|e| {
                        EngineError::Core(CoreError::Internal(format!(
                            "prompt metadata serialization failed: {e}"
                        )))
                    })?,
                    combination_key: prompt.combination_key(),
                },
            )
            .await?;
            let candidate = GenerationRepo::insert(
                &self.pool,
                &CreateCandidate {
                    batch_id,
                    user_id: request.user_id,
                    prompt_artifact_id: artifact.id,
                },
            )
            .await?;
            candidate_ids.push(candidate.id);
            artifacts.push(artifact);
        }

        let outcome = self
            .orchestrator
            .run(batch_id, request.user_id, &composed, cancel)
            .await;

        for failure in &outcome.failed {
            GenerationRepo::mark_failed(&self.pool, candidate_ids[failure.index], &failure.error)
                .await?;
        }
        let mut records: Vec<(usize, CandidateRecord)> = Vec::with_capacity(outcome.completed.len());
        for unit in &outcome.completed {
            let row = GenerationRepo::mark_completed(
                &self.pool,
                candidate_ids[unit.index],
                &CandidateResult {
                    image_url: unit.image_url.clone(),
                    storage_key: unit.storage_key.clone(),
                    provider: unit.provider.clone(),
                    cost_cents: unit.cost_cents,
                },
            )
            .await?;
            records.push((
                unit.index,
                CandidateRecord {
                    generation_id: row.id,
                    image_url: unit.image_url.clone(),
                    created_at: row.created_at,
                },
            ));
        }

        // Units that were never issued (cancellation or batch timeout) stay
        // pending and are excluded from validation.

        let baseline = ValidationRepo::success_baseline(
            &self.pool,
            request.user_id,
            self.config.baseline_window,
        )
        .await?
        .unwrap_or(DEFAULT_SUCCESS_BASELINE);

        let mut validations = Vec::with_capacity(records.len());
        for (index, record) in &records {
            let metadata = &composed[*index].metadata;
            let target = ValidationTarget {
                garment_type: spec.garment_type.clone(),
                tokens: metadata.tokens.clone(),
                primary_aesthetic: dna.as_ref().map(|d| d.primary_aesthetic.clone()),
                secondary_aesthetics: dna
                    .as_ref()
                    .map(|d| d.secondary_aesthetics.clone())
                    .unwrap_or_default(),
            };
            let validation = self
                .validator
                .validate_candidate(record, &target, baseline)
                .await;
            self.persist_validation(&validation).await?;
            validations.push(validation);
        }

        self.bus.publish(
            PipelineEvent::new(event_types::BATCH_VALIDATED)
                .for_batch(batch_id)
                .for_user(request.user_id)
                .with_payload(serde_json::json!({ "validated": validations.len() })),
        );

        let selection = select_top(validations, request.quantity as usize);

        for (validation, disposition) in &selection.archived {
            self.archive_candidate(request.user_id, validation, *disposition, &artifacts)
                .await?;
        }

        // Implicit positive signal from high-confidence validations.
        for validation in &selection.selected {
            if self.validator.auto_positive(validation) {
                let _ = self
                    .learner
                    .ingest_auto_positive(request.user_id, validation.generation_id)
                    .await?;
            }
        }

        let candidates: Vec<CandidateSummary> = selection
            .selected
            .iter()
            .map(|validation| {
                let image_url = records
                    .iter()
                    .find(|(_, r)| r.generation_id == validation.generation_id)
                    .map(|(_, r)| r.image_url.clone())
                    .unwrap_or_default();
                CandidateSummary {
                    generation_id: validation.generation_id,
                    image_url,
                    overall_score: validation.scores.overall_score,
                    consistency_score: validation.scores.consistency_score,
                    style_score: validation.scores.style_score,
                    outlier_score: validation.scores.outlier_score,
                    is_outlier: validation.scores.is_outlier,
                    flagged: validation.decision == ValidationDecision::Flagged,
                }
            })
            .collect();

        let response = GenerateResponse {
            batch_id,
            shortfall: shortfall(request.quantity, candidates.len() as u32),
            generated_count: outcome.completed.len() as u32,
            failed_count: outcome.failed.len() as u32,
            total_cost_cents: outcome.total_cost_cents,
            enforcement_disabled,
            timed_out: outcome.timed_out,
            candidates,
            artifacts,
        };

        self.bus.publish(
            PipelineEvent::new(event_types::BATCH_COMPLETED)
                .for_batch(batch_id)
                .for_user(request.user_id)
                .with_payload(serde_json::json!({
                    "returned": response.candidates.len(),
                    "shortfall": response.shortfall,
                    "cost_cents": response.total_cost_cents,
                })),
        );
        tracing::info!(
            user_id = request.user_id,
            %batch_id,
            requested = request.quantity,
            generated = response.generated_count,
            returned = response.candidates.len(),
            shortfall = response.shortfall,
            "generation batch finished"
        );

        Ok(response)
    }

    /// Record one feedback event.
    pub async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackOutcome, EngineError> {
        self.learner.ingest_feedback(request).await
    }

    /// Rebuild a user's style profile from analyzed portfolio images and
    /// re-extract their brand DNA.
    pub async fn refresh_style_profile(
        &self,
        user_id: DbId,
        records: &[GarmentAttributes],
    ) -> Result<BrandDna, EngineError> {
        if records.is_empty() {
            return Err(EngineError::validation(
                "at least one analyzed image is required",
            ));
        }

        let previous = self.load_brand_dna(user_id).await?;
        let latest = StyleProfileRepo::get_latest(&self.pool, user_id).await?;
        let next_version = latest.map(|p| p.version + 1).unwrap_or(1);
        let profile = build_style_profile(user_id, next_version, records);

        StyleProfileRepo::insert(
            &self.pool,
            &CreateStyleProfile {
                user_id,
                images_analyzed: profile.images_analyzed as i32,
                overall_confidence: profile.overall_confidence,
                profile_json: serde_json::to_value(&profile).map_err(|e| {
                    EngineError::Core(CoreError::Internal(format!(
                        "style profile serialization failed: {e}"
                    )))
                })?,
            },
        )
        .await?;

        let dna = extract_brand_dna(
            &profile,
            DEFAULT_SIGNATURE_COUNT,
            previous.as_ref(),
            Utc::now(),
        );
        let upsert = UpsertBrandDna::from_domain(&dna).map_err(|e| {
            EngineError::Core(CoreError::Internal(format!(
                "brand DNA serialization failed: {e}"
            )))
        })?;
        BrandDnaRepo::upsert(&self.pool, &upsert).await?;

        tracing::info!(
            user_id,
            version = next_version,
            images = records.len(),
            drift = dna.drift_score,
            "style profile refreshed"
        );
        Ok(dna)
    }

    /// Learning read APIs.
    pub fn learner(&self) -> &FeedbackLearner {
        &self.learner
    }

    // -- Internals ----------------------------------------------------------

    async fn load_brand_dna(&self, user_id: DbId) -> Result<Option<BrandDna>, EngineError> {
        match BrandDnaRepo::get_by_user(&self.pool, user_id).await? {
            Some(row) => {
                let dna = row.to_domain().map_err(|e| {
                    EngineError::Core(CoreError::Internal(format!(
                        "corrupt brand DNA for user {user_id}: {e}"
                    )))
                })?;
                Ok(Some(dna))
            }
            None => Ok(None),
        }
    }

    async fn persist_validation(
        &self,
        validation: &CandidateValidation,
    ) -> Result<(), EngineError> {
        let (decision, reason) = match &validation.decision {
            ValidationDecision::Accepted => ("accepted", None),
            ValidationDecision::Flagged => ("flagged", None),
            ValidationDecision::Rejected(reason) => ("rejected", Some(reason.clone())),
        };
        ValidationRepo::insert(
            &self.pool,
            &CreateValidationResult {
                generation_id: validation.generation_id,
                consistency_score: validation.scores.consistency_score,
                style_score: validation.scores.style_score,
                outlier_score: validation.scores.outlier_score,
                overall_score: validation.scores.overall_score,
                is_outlier: validation.scores.is_outlier,
                decision: decision.to_string(),
                rejection_reason: reason,
                comparisons_json: serde_json::to_value(&validation.comparisons).map_err(|e| {
                    EngineError::Core(CoreError::Internal(format!(
                        "comparison serialization failed: {e}"
                    )))
                })?,
            },
        )
        .await?;
        Ok(())
    }

    async fn archive_candidate(
        &self,
        user_id: DbId,
        validation: &CandidateValidation,
        disposition: RlhfDisposition,
        artifacts: &[PromptArtifact],
    ) -> Result<(), EngineError> {
        let candidate = GenerationRepo::get_by_id(&self.pool, validation.generation_id)
            .await?
            .ok_or_else(|| EngineError::not_found("generation", validation.generation_id))?;
        let artifact = artifacts
            .iter()
            .find(|a| a.id == candidate.prompt_artifact_id)
            .ok_or_else(|| {
                EngineError::not_found("prompt_artifact", candidate.prompt_artifact_id)
            })?;

        let disposition = match disposition {
            RlhfDisposition::Negative => "negative",
            RlhfDisposition::Neutral => "neutral",
        };
        RlhfRepo::insert(
            &self.pool,
            &CreateRlhfExample {
                generation_id: validation.generation_id,
                user_id,
                disposition: disposition.to_string(),
                positive_prompt: artifact.positive_prompt.clone(),
                overall_score: validation.scores.overall_score,
                metadata_json: artifact.metadata_json.clone(),
            },
        )
        .await?;
        Ok(())
    }
}
