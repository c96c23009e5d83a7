//! Over-generation orchestrator: issues provider calls for a batch under
//! bounded concurrency with per-unit failure isolation.
//!
//! Units run in waves of `batch_width`. A failure removes only that unit
//! from the result set; cancellation and the batch deadline stop new waves
//! from being issued but let in-flight calls finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_core::overgen::total_cost_cents;
use atelier_core::types::DbId;
use atelier_events::bus::event_types;
use atelier_events::{EventBus, PipelineEvent};
use atelier_provider::{GenerationProvider, GenerationRequest, ObjectStorage};

use crate::composer::ComposedPrompt;
use crate::config::EngineConfig;

/// One successfully generated and durably stored candidate image.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Index into the composed prompt list.
    pub index: usize,
    pub image_url: String,
    pub storage_key: String,
    pub provider: String,
    pub cost_cents: i64,
}

/// One isolated unit failure.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub index: usize,
    pub error: String,
}

/// The outcome of one over-generation run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub completed: Vec<GeneratedUnit>,
    pub failed: Vec<UnitFailure>,
    /// Cost summed over completed units only.
    pub total_cost_cents: i64,
    /// True when the batch deadline expired before every unit was issued.
    pub timed_out: bool,
}

/// Runs provider calls for a composed batch.
pub struct Orchestrator {
    provider: Arc<dyn GenerationProvider>,
    storage: Arc<dyn ObjectStorage>,
    bus: Arc<EventBus>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        storage: Arc<dyn ObjectStorage>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            storage,
            bus,
            config,
        }
    }

    /// Generate every composed prompt, in waves of `batch_width`.
    ///
    /// Never returns an error: provider failures are isolated per unit and
    /// reported in the outcome.
    pub async fn run(
        &self,
        batch_id: Uuid,
        user_id: DbId,
        prompts: &[ComposedPrompt],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let deadline = Instant::now() + Duration::from_secs(self.config.batch_timeout_secs);
        let mut outcome = BatchOutcome::default();

        self.bus.publish(
            PipelineEvent::new(event_types::BATCH_STARTED)
                .for_batch(batch_id)
                .for_user(user_id)
                .with_payload(serde_json::json!({ "units": prompts.len() })),
        );

        let mut first_wave = true;
        for wave in prompts.iter().enumerate().collect::<Vec<_>>().chunks(self.config.batch_width.max(1)) {
            if cancel.is_cancelled() {
                tracing::info!(%batch_id, "batch cancelled, not issuing further calls");
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(%batch_id, "batch deadline reached, finalizing with partial result");
                outcome.timed_out = true;
                break;
            }
            if !first_wave && self.config.pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.pacing_ms)).await;
            }
            first_wave = false;

            let results = futures::future::join_all(
                wave.iter()
                    .map(|&(index, prompt)| self.run_unit(batch_id, index, prompt)),
            )
            .await;

            for result in results {
                match result {
                    Ok(unit) => {
                        self.bus.publish(
                            PipelineEvent::new(event_types::CANDIDATE_GENERATED)
                                .for_batch(batch_id)
                                .for_user(user_id)
                                .with_payload(serde_json::json!({
                                    "index": unit.index,
                                    "cost_cents": unit.cost_cents,
                                })),
                        );
                        outcome.completed.push(unit);
                    }
                    Err(failure) => {
                        tracing::warn!(
                            %batch_id,
                            index = failure.index,
                            error = %failure.error,
                            "candidate generation failed"
                        );
                        self.bus.publish(
                            PipelineEvent::new(event_types::CANDIDATE_FAILED)
                                .for_batch(batch_id)
                                .for_user(user_id)
                                .with_payload(serde_json::json!({
                                    "index": failure.index,
                                    "error": failure.error,
                                })),
                        );
                        outcome.failed.push(failure);
                    }
                }
            }
        }

        outcome.total_cost_cents =
            total_cost_cents(outcome.completed.iter().map(|u| u.cost_cents));
        outcome
    }

    /// One isolated (provider call → durable store) unit.
    async fn run_unit(
        &self,
        batch_id: Uuid,
        index: usize,
        prompt: &ComposedPrompt,
    ) -> Result<GeneratedUnit, UnitFailure> {
        let request = GenerationRequest {
            positive_prompt: prompt.prompt.positive.clone(),
            negative_prompt: prompt.prompt.negative.clone(),
            seed: prompt.seed as i64,
        };

        let call_timeout = Duration::from_secs(self.config.call_timeout_secs);
        let image = match timeout(call_timeout, self.provider.generate(&request)).await {
            Ok(Ok(image)) => image,
            Ok(Err(e)) => {
                return Err(UnitFailure {
                    index,
                    error: e.to_string(),
                })
            }
            Err(_) => {
                return Err(UnitFailure {
                    index,
                    error: format!("provider call timed out after {}s", call_timeout.as_secs()),
                })
            }
        };

        let stored = match timeout(call_timeout, self.storage.store(batch_id, &image.image_url))
            .await
        {
            Ok(Ok(stored)) => stored,
            Ok(Err(e)) => {
                return Err(UnitFailure {
                    index,
                    error: format!("storage failed: {e}"),
                })
            }
            Err(_) => {
                return Err(UnitFailure {
                    index,
                    error: "storage call timed out".to_string(),
                })
            }
        };

        Ok(GeneratedUnit {
            index,
            image_url: stored.url,
            storage_key: stored.key,
            provider: image.provider,
            cost_cents: image.cost_cents,
        })
    }
}
