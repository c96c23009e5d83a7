//! In-memory fakes shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use atelier_core::bandit::TokenPosterior;
use atelier_core::brand_dna::{BrandDna, PhotographyPreferences};
use atelier_core::profile::GarmentAttributes;
use atelier_core::token::{default_candidates, TokenCategory};
use atelier_core::types::DbId;
use atelier_pipeline::error::EngineError;
use atelier_pipeline::store::{CategoryWeights, WeightStore};
use atelier_pipeline::EngineConfig;
use atelier_provider::{
    GeneratedImage, GenerationProvider, GenerationRequest, ObjectStorage, ProviderError,
    StoredObject, VisualAnalyst,
};

// ---------------------------------------------------------------------------
// Weight store
// ---------------------------------------------------------------------------

/// Posterior storage backed by a plain map, for tests that exercise the
/// composer and learner without Postgres.
#[derive(Default)]
pub struct MemoryWeightStore {
    weights: Mutex<HashMap<(DbId, TokenCategory), HashMap<String, TokenPosterior>>>,
    global: Mutex<HashMap<TokenCategory, HashMap<String, TokenPosterior>>>,
    usage: Mutex<HashMap<(DbId, TokenCategory, String), u64>>,
}

impl MemoryWeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a posterior with pre-existing observations.
    pub fn seed(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
        successes: u64,
        failures: u64,
    ) {
        let mut weights = self.weights.lock().unwrap();
        weights.entry((user_id, category)).or_default().insert(
            token.to_string(),
            TokenPosterior::new(1.0 + successes as f64, 1.0 + failures as f64),
        );
    }

    /// Seed a population-level posterior.
    pub fn seed_global(&self, category: TokenCategory, token: &str, successes: u64, failures: u64) {
        let mut global = self.global.lock().unwrap();
        global.entry(category).or_default().insert(
            token.to_string(),
            TokenPosterior::new(1.0 + successes as f64, 1.0 + failures as f64),
        );
    }

    pub fn posterior(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
    ) -> Option<TokenPosterior> {
        let weights = self.weights.lock().unwrap();
        weights.get(&(user_id, category))?.get(token).cloned()
    }

    pub fn usage_count(&self, user_id: DbId, category: TokenCategory, token: &str) -> u64 {
        let usage = self.usage.lock().unwrap();
        usage
            .get(&(user_id, category, token.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl WeightStore for MemoryWeightStore {
    async fn load_category(
        &self,
        user_id: DbId,
        category: TokenCategory,
    ) -> Result<CategoryWeights, EngineError> {
        let weights = self.weights.lock().unwrap();
        let user = weights
            .get(&(user_id, category))
            .cloned()
            .unwrap_or_default();
        let user_observations = user.values().map(|p| p.observations() as u64).sum();
        let global = self
            .global
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default();
        Ok(CategoryWeights {
            user,
            global,
            user_observations,
        })
    }

    async fn record_outcome(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
        success: bool,
    ) -> Result<(), EngineError> {
        let mut weights = self.weights.lock().unwrap();
        weights
            .entry((user_id, category))
            .or_default()
            .entry(token.to_string())
            .or_insert_with(TokenPosterior::uniform)
            .record(success);
        Ok(())
    }

    async fn record_usage(
        &self,
        user_id: DbId,
        category: TokenCategory,
        token: &str,
    ) -> Result<(), EngineError> {
        let mut usage = self.usage.lock().unwrap();
        *usage
            .entry((user_id, category, token.to_string()))
            .or_insert(0) += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Provider fakes
// ---------------------------------------------------------------------------

/// Generation provider that succeeds with a URL derived from the seed, and
/// fails for any seed listed in `fail_seeds`.
pub struct MockProvider {
    pub cost_cents: i64,
    pub fail_seeds: Vec<i64>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            cost_cents: 4,
            fail_seeds: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_seeds(fail_seeds: Vec<i64>) -> Self {
        Self {
            fail_seeds,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_seeds.contains(&request.seed) {
            return Err(ProviderError::Api {
                status: 503,
                body: "capacity exhausted".to_string(),
            });
        }
        Ok(GeneratedImage {
            image_url: format!("https://img.test/{}.png", request.seed),
            provider: "mock-diffusion".to_string(),
            cost_cents: self.cost_cents,
        })
    }
}

/// Visual analyst that replays a fixed response, or fails outright when
/// constructed with [`MockAnalyst::offline`].
pub struct MockAnalyst {
    response: Option<GarmentAttributes>,
}

impl MockAnalyst {
    pub fn returning(attributes: GarmentAttributes) -> Self {
        Self {
            response: Some(attributes),
        }
    }

    pub fn offline() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl VisualAnalyst for MockAnalyst {
    async fn analyze(&self, _image_url: &str) -> Result<GarmentAttributes, ProviderError> {
        match &self.response {
            Some(attributes) => Ok(attributes.clone()),
            None => Err(ProviderError::Api {
                status: 502,
                body: "analyst offline".to_string(),
            }),
        }
    }
}

/// Object storage that mirrors the source URL into a fake CDN namespace.
pub struct MockStorage;

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn store(&self, batch_id: Uuid, source_url: &str) -> Result<StoredObject, ProviderError> {
        let name = source_url.rsplit('/').next().unwrap_or("image");
        Ok(StoredObject {
            url: format!("https://cdn.test/{batch_id}/{name}"),
            key: format!("{batch_id}/{name}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A confident brand DNA whose signatures come from the default catalogs,
/// so enforcement has real candidates to bias toward.
pub fn confident_dna(user_id: DbId) -> BrandDna {
    BrandDna {
        user_id,
        primary_aesthetic: "minimalist".to_string(),
        secondary_aesthetics: vec!["modern".to_string()],
        signature_colors: vec!["black".to_string(), "navy".to_string()],
        signature_fabrics: vec!["wool".to_string()],
        signature_construction: vec!["tailored".to_string()],
        preferred_photography: PhotographyPreferences::default(),
        aesthetic_confidence: 0.8,
        overall_confidence: 0.8,
        drift_score: 0.0,
        last_updated: Utc::now(),
    }
}

/// Analyst attributes that match any sampled token exactly: the detected
/// lists carry the full default catalog for each compared category.
pub fn omniscient_attributes(garment_type: &str, aesthetic: &str) -> GarmentAttributes {
    let all = |category: TokenCategory| -> Vec<String> {
        default_candidates(category)
            .iter()
            .map(|t| t.to_string())
            .collect()
    };
    GarmentAttributes {
        garment_type: garment_type.to_string(),
        colors: all(TokenCategory::Color),
        fabrics: all(TokenCategory::Fabric),
        construction: all(TokenCategory::Construction),
        style_aesthetic: aesthetic.to_string(),
        shot_type: None,
        lighting: None,
        angle: None,
        confidence: 0.9,
    }
}

/// Engine config with short timeouts and no pacing, suitable for tests.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        pacing_ms: 0,
        call_timeout_secs: 5,
        batch_timeout_secs: 30,
        ..EngineConfig::default()
    }
}
