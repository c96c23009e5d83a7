//! Prompt composition: one artifact per requested image, sampled from the
//! bandit posteriors and biased toward the user's brand signatures.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use atelier_core::bandit::select_weighted_index;
use atelier_core::brand_dna::{
    brand_consistency_score, enforcement_enabled, enforcement_weight, signatures_for, BrandDna,
};
use atelier_core::prompt::{
    anti_signatures, assemble_prompt, combination_key, AssembledPrompt, PromptInputs,
    PromptMetadata, SelectedToken, METADATA_SCHEMA_VERSION,
};
use atelier_core::routing::{assign_variant, assign_variant_exploring, BuilderVariant};
use atelier_core::token::{default_candidates, TokenCategory, ALL_CATEGORIES};
use atelier_core::types::DbId;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::store::{CategoryWeights, WeightStore};

/// The caller's creative intent for one batch.
#[derive(Debug, Clone)]
pub struct GenerationSpec {
    pub garment_type: String,
    /// Free-text modifiers, already trimmed.
    pub modifiers: Option<String>,
    /// When true, modifiers are weighted ahead of sampled tokens.
    pub high_specificity: bool,
}

/// One fully composed prompt, ready for the provider.
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    pub variant: BuilderVariant,
    pub prompt: AssembledPrompt,
    pub seed: u64,
    pub metadata: PromptMetadata,
}

impl ComposedPrompt {
    /// The token combination fingerprint used for diversity checks.
    pub fn combination_key(&self) -> String {
        self.metadata.combination_key()
    }
}

/// Composes prompt artifacts for a batch.
pub struct PromptComposer {
    store: Arc<dyn WeightStore>,
    config: EngineConfig,
}

impl PromptComposer {
    pub fn new(store: Arc<dyn WeightStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Compose `count` prompts for one batch.
    ///
    /// Identical `base_seed` reproduces the identical artifact set. Within
    /// the batch no two prompts share a full token combination; on a
    /// collision the token set is resampled up to the configured limit,
    /// after which the duplicate is allowed (the token space may simply be
    /// exhausted).
    #[allow(clippy::too_many_arguments)]
    pub async fn compose_batch(
        &self,
        user_id: DbId,
        batch_id: Uuid,
        spec: &GenerationSpec,
        dna: Option<&BrandDna>,
        enforce: bool,
        strength: f64,
        explore: bool,
        count: u32,
        base_seed: u64,
    ) -> Result<Vec<ComposedPrompt>, EngineError> {
        let enforcement_active = enforce && enforcement_enabled(dna);
        let enforcement_disabled = enforce && !enforcement_active;

        // One load per category, shared by every prompt in the batch.
        let mut catalogs: Vec<(TokenCategory, Vec<String>, CategoryWeights)> = Vec::new();
        for &category in ALL_CATEGORIES {
            let weights = self.store.load_category(user_id, category).await?;
            let mut candidates: Vec<String> = default_candidates(category)
                .iter()
                .map(|t| t.to_string())
                .collect();
            for token in weights.user.keys().chain(weights.global.keys()) {
                if !candidates.iter().any(|c| c == token) {
                    candidates.push(token.clone());
                }
            }
            candidates.sort();
            catalogs.push((category, candidates, weights));
        }

        let sticky_variant = assign_variant(user_id, batch_id, self.config.experimental_percent);
        let negatives = dna.map(anti_signatures).unwrap_or_default();

        let mut seen_combinations: HashSet<String> = HashSet::new();
        let mut composed = Vec::with_capacity(count as usize);
        for index in 0..count {
            let variant = if explore {
                assign_variant_exploring(
                    user_id,
                    batch_id,
                    index,
                    self.config.experimental_percent,
                )
            } else {
                sticky_variant
            };

            let seed = base_seed.wrapping_add(index as u64);
            let mut rng = StdRng::seed_from_u64(seed);

            let mut tokens = self.sample_tokens(
                &mut rng,
                &catalogs,
                dna,
                enforcement_active,
                strength,
                variant,
            );
            let mut attempts = 0;
            while seen_combinations.contains(&combination_key(&tokens))
                && attempts < self.config.resample_limit
            {
                tokens = self.sample_tokens(
                    &mut rng,
                    &catalogs,
                    dna,
                    enforcement_active,
                    strength,
                    variant,
                );
                attempts += 1;
            }
            seen_combinations.insert(combination_key(&tokens));

            for token in &tokens {
                self.store
                    .record_usage(user_id, token.category, &token.value)
                    .await?;
            }

            let consistency = dna
                .map(|d| {
                    let pairs: Vec<(TokenCategory, String)> = tokens
                        .iter()
                        .map(|t| (t.category, t.value.clone()))
                        .collect();
                    brand_consistency_score(&pairs, d)
                })
                .unwrap_or(0.0);

            let inputs = PromptInputs {
                garment_type: &spec.garment_type,
                tokens: &tokens,
                modifiers: spec.modifiers.as_deref(),
                high_specificity: spec.high_specificity,
                primary_aesthetic: dna.map(|d| d.primary_aesthetic.as_str()),
            };
            let prompt = assemble_prompt(&inputs, &negatives);

            composed.push(ComposedPrompt {
                variant,
                prompt,
                seed,
                metadata: PromptMetadata {
                    schema_version: METADATA_SCHEMA_VERSION,
                    seed,
                    builder_variant: variant.as_str().to_string(),
                    tokens,
                    brand_consistency_score: consistency,
                    enforcement_disabled,
                    modifier_emphasis: spec.high_specificity,
                },
            });
        }

        tracing::debug!(
            user_id,
            %batch_id,
            count,
            enforcement_active,
            "composed prompt batch"
        );
        Ok(composed)
    }

    /// Sample one token per category.
    ///
    /// The standard builder applies brand-DNA weights; the experimental
    /// builder samples the raw posteriors for wider exploration.
    fn sample_tokens(
        &self,
        rng: &mut StdRng,
        catalogs: &[(TokenCategory, Vec<String>, CategoryWeights)],
        dna: Option<&BrandDna>,
        enforcement_active: bool,
        strength: f64,
        variant: BuilderVariant,
    ) -> Vec<SelectedToken> {
        let mut tokens = Vec::with_capacity(catalogs.len());
        for (category, candidates, weights) in catalogs {
            let posteriors: Vec<_> = candidates
                .iter()
                .map(|token| weights.effective(token, self.config.cold_start_floor))
                .collect();

            let bias: Option<Vec<f64>> = match (enforcement_active, variant, dna) {
                (true, BuilderVariant::Standard, Some(dna)) => {
                    let signatures = signatures_for(dna, *category);
                    Some(
                        candidates
                            .iter()
                            .map(|token| enforcement_weight(token, signatures, strength))
                            .collect(),
                    )
                }
                _ => None,
            };

            // Candidate lists are never empty, so the argmax always exists.
            if let Some(i) = select_weighted_index(rng, &posteriors, bias.as_deref()) {
                tokens.push(SelectedToken {
                    category: *category,
                    value: candidates[i].clone(),
                    weight: posteriors[i].mean(),
                });
            }
        }
        tokens
    }
}
