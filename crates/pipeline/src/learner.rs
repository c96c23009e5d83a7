//! Feedback learner: converts explicit feedback and implicit validation
//! signal into weight store updates.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use atelier_core::feedback::{
    FeedbackSignal, FeedbackStats, FeedbackType, SOURCE_EXPLICIT, SOURCE_VALIDATION_AUTO,
};
use atelier_core::prompt::PromptMetadata;
use atelier_core::types::DbId;
use atelier_core::CoreError;
use atelier_db::models::feedback::CreateFeedbackEvent;
use atelier_db::models::token_weight::TokenWeight;
use atelier_db::repositories::{
    FeedbackRepo, GenerationRepo, PromptArtifactRepo, RlhfRepo, TokenWeightRepo,
};
use atelier_events::bus::event_types;
use atelier_events::{EventBus, PipelineEvent};

use crate::error::EngineError;
use crate::store::WeightStore;

/// One feedback submission.
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub user_id: DbId,
    pub generation_id: DbId,
    pub feedback_type: FeedbackType,
    pub note: Option<String>,
}

/// Result of a feedback submission.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOutcome {
    /// False when this `(generation, type)` pair was already recorded;
    /// duplicates update no counters.
    pub accepted: bool,
}

/// Aggregate learning statistics for a user.
#[derive(Debug, Clone, Serialize)]
pub struct LearningStats {
    pub total_events: u64,
    pub successes: u64,
    pub failures: u64,
    pub neutral: u64,
    pub success_rate: Option<f64>,
    /// Distinct `(category, token)` posteriors tracked for the user.
    pub tokens_tracked: usize,
}

/// Applies feedback to the weight store and answers learning queries.
pub struct FeedbackLearner {
    pool: PgPool,
    store: Arc<dyn WeightStore>,
    bus: Arc<EventBus>,
}

impl FeedbackLearner {
    pub fn new(pool: PgPool, store: Arc<dyn WeightStore>, bus: Arc<EventBus>) -> Self {
        Self { pool, store, bus }
    }

    /// Ingest one explicit feedback event.
    ///
    /// Unknown or archived generations fail with NotFound before any
    /// counter moves. A repeated `(generation, type)` pair is accepted as
    /// a no-op; the weight store is updated exactly once per pair.
    pub async fn ingest_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackOutcome, EngineError> {
        self.record_signal(
            request.user_id,
            request.generation_id,
            request.feedback_type,
            SOURCE_EXPLICIT,
            request.note.as_deref(),
        )
        .await
    }

    /// Derive an implicit positive signal from a high validation score.
    ///
    /// Idempotent with explicit positive feedback on the same image: both
    /// land on the same `(generation, like)` pair.
    pub async fn ingest_auto_positive(
        &self,
        user_id: DbId,
        generation_id: DbId,
    ) -> Result<FeedbackOutcome, EngineError> {
        self.record_signal(
            user_id,
            generation_id,
            FeedbackType::Like,
            SOURCE_VALIDATION_AUTO,
            None,
        )
        .await
    }

    async fn record_signal(
        &self,
        user_id: DbId,
        generation_id: DbId,
        feedback_type: FeedbackType,
        source: &str,
        note: Option<&str>,
    ) -> Result<FeedbackOutcome, EngineError> {
        let candidate = GenerationRepo::get_by_id(&self.pool, generation_id)
            .await?
            .ok_or_else(|| EngineError::not_found("generation", generation_id))?;
        if RlhfRepo::exists_for_generation(&self.pool, generation_id).await? {
            return Err(EngineError::not_found("generation", generation_id));
        }

        let inserted = FeedbackRepo::insert(
            &self.pool,
            &CreateFeedbackEvent {
                generation_id,
                user_id,
                feedback_type: feedback_type.as_str().to_string(),
                source: source.to_string(),
                comment_text: note.map(str::to_string),
            },
        )
        .await?;
        if inserted.is_none() {
            tracing::debug!(generation_id, %feedback_type, "duplicate feedback ignored");
            return Ok(FeedbackOutcome { accepted: false });
        }

        self.bus.publish(
            PipelineEvent::new(event_types::FEEDBACK_RECORDED)
                .for_batch(candidate.batch_id)
                .for_user(user_id)
                .with_payload(serde_json::json!({
                    "generation_id": generation_id,
                    "type": feedback_type.as_str(),
                    "source": source,
                })),
        );

        let success = match feedback_type.signal() {
            FeedbackSignal::Success => true,
            FeedbackSignal::Failure => false,
            // Comment sentiment is not analyzed; the event is stored
            // without moving any posterior.
            FeedbackSignal::Neutral => return Ok(FeedbackOutcome { accepted: true }),
        };

        let artifact = PromptArtifactRepo::get_by_id(&self.pool, candidate.prompt_artifact_id)
            .await?
            .ok_or_else(|| {
                EngineError::not_found("prompt_artifact", candidate.prompt_artifact_id)
            })?;
        let metadata: PromptMetadata =
            serde_json::from_value(artifact.metadata_json).map_err(|e| {
                EngineError::Core(CoreError::Internal(format!(
                    "corrupt prompt metadata for artifact {}: {e}",
                    artifact.id
                )))
            })?;

        for token in &metadata.tokens {
            self.store
                .record_outcome(user_id, token.category, &token.value, success)
                .await?;
        }

        self.bus.publish(
            PipelineEvent::new(event_types::WEIGHTS_UPDATED)
                .for_batch(candidate.batch_id)
                .for_user(user_id)
                .with_payload(serde_json::json!({
                    "tokens": metadata.tokens.len(),
                    "success": success,
                })),
        );

        Ok(FeedbackOutcome { accepted: true })
    }

    // -- Read APIs ----------------------------------------------------------

    /// Every posterior row tracked for a user.
    pub async fn get_weights(&self, user_id: DbId) -> Result<Vec<TokenWeight>, EngineError> {
        Ok(TokenWeightRepo::get_for_user(&self.pool, user_id).await?)
    }

    /// Top tokens in one category ranked by posterior mean.
    pub async fn get_top_tokens(
        &self,
        user_id: DbId,
        category: &str,
        limit: i64,
    ) -> Result<Vec<TokenWeight>, EngineError> {
        Ok(TokenWeightRepo::top_for_user_category(&self.pool, user_id, category, limit).await?)
    }

    /// Aggregate learning statistics for a user.
    pub async fn get_learning_stats(&self, user_id: DbId) -> Result<LearningStats, EngineError> {
        let mut stats = FeedbackStats::default();
        for row in FeedbackRepo::count_by_type(&self.pool, user_id).await? {
            let signal = FeedbackType::parse(&row.feedback_type)?.signal();
            let count = row.count.max(0) as u64;
            stats.total_events += count;
            match signal {
                FeedbackSignal::Success => stats.successes += count,
                FeedbackSignal::Failure => stats.failures += count,
                FeedbackSignal::Neutral => stats.neutral += count,
            }
        }
        let weights = TokenWeightRepo::get_for_user(&self.pool, user_id).await?;

        Ok(LearningStats {
            total_events: stats.total_events,
            successes: stats.successes,
            failures: stats.failures,
            neutral: stats.neutral,
            success_rate: stats.success_rate(),
            tokens_tracked: weights.len(),
        })
    }
}
