//! Composer, orchestrator, and validator behavior against in-memory fakes.

mod common;

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_core::scoring::{ValidationDecision, REASON_VALIDATION_UNAVAILABLE};
use atelier_core::token::TokenCategory;
use atelier_events::EventBus;
use atelier_pipeline::composer::{GenerationSpec, PromptComposer};
use atelier_pipeline::orchestrator::Orchestrator;
use atelier_pipeline::store::WeightStore;
use atelier_pipeline::validator::{CandidateRecord, ValidationTarget, Validator};
use atelier_pipeline::EngineConfig;

use common::{
    confident_dna, omniscient_attributes, test_config, MemoryWeightStore, MockAnalyst,
    MockProvider, MockStorage,
};

const USER: i64 = 7;

fn spec(garment: &str) -> GenerationSpec {
    GenerationSpec {
        garment_type: garment.to_string(),
        modifiers: None,
        high_specificity: false,
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_seed_reproduces_the_batch() {
    let store = Arc::new(MemoryWeightStore::new());
    let composer = PromptComposer::new(store, test_config());
    let batch_id = Uuid::new_v4();
    let dna = confident_dna(USER);

    let first = composer
        .compose_batch(USER, batch_id, &spec("dress"), Some(&dna), true, 0.7, false, 6, 42)
        .await
        .unwrap();
    let second = composer
        .compose_batch(USER, batch_id, &spec("dress"), Some(&dna), true, 0.7, false, 6, 42)
        .await
        .unwrap();

    assert_eq!(first.len(), 6);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.prompt.positive, b.prompt.positive);
        assert_eq!(a.prompt.negative, b.prompt.negative);
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.combination_key(), b.combination_key());
    }
}

#[tokio::test]
async fn batch_combinations_are_distinct() {
    let store = Arc::new(MemoryWeightStore::new());
    let composer = PromptComposer::new(store, test_config());

    let composed = composer
        .compose_batch(USER, Uuid::new_v4(), &spec("coat"), None, false, 0.7, false, 8, 9)
        .await
        .unwrap();

    let keys: std::collections::HashSet<String> =
        composed.iter().map(|p| p.combination_key()).collect();
    assert_eq!(keys.len(), composed.len());
}

#[tokio::test]
async fn composition_records_token_usage() {
    let store = Arc::new(MemoryWeightStore::new());
    let composer = PromptComposer::new(store.clone(), test_config());

    let composed = composer
        .compose_batch(USER, Uuid::new_v4(), &spec("coat"), None, false, 0.7, false, 3, 1)
        .await
        .unwrap();

    let token = &composed[0].metadata.tokens[0];
    assert!(store.usage_count(USER, token.category, &token.value) >= 1);
}

#[tokio::test]
async fn enforcement_strength_steers_toward_signatures() {
    let dna = confident_dna(USER);
    let config = EngineConfig {
        experimental_percent: 0,
        ..test_config()
    };
    let batch_id = Uuid::new_v4();

    let signature_share = |strength: f64| {
        let dna = dna.clone();
        let config = config.clone();
        async move {
            let composer = PromptComposer::new(Arc::new(MemoryWeightStore::new()), config);
            let composed = composer
                .compose_batch(
                    USER, batch_id, &spec("dress"), Some(&dna), true, strength, false, 40, 7,
                )
                .await
                .unwrap();
            let hits = composed
                .iter()
                .flat_map(|p| &p.metadata.tokens)
                .filter(|t| t.category == TokenCategory::Color)
                .filter(|t| dna.signature_colors.iter().any(|s| s == &t.value))
                .count();
            hits as f64 / composed.len() as f64
        }
    };

    let strict = signature_share(0.9).await;
    let loose = signature_share(0.1).await;
    assert!(
        strict > loose,
        "strength 0.9 share {strict} should exceed strength 0.1 share {loose}"
    );
    assert!(strict >= 0.9, "strength 0.9 share {strict} too low");
}

#[tokio::test]
async fn low_confidence_dna_disables_enforcement() {
    let store = Arc::new(MemoryWeightStore::new());
    let composer = PromptComposer::new(store, test_config());
    let mut dna = confident_dna(USER);
    dna.overall_confidence = 0.1;

    let composed = composer
        .compose_batch(USER, Uuid::new_v4(), &spec("dress"), Some(&dna), true, 0.9, false, 2, 3)
        .await
        .unwrap();

    assert!(composed.iter().all(|p| p.metadata.enforcement_disabled));
}

#[tokio::test]
async fn cold_start_blends_with_population_weights() {
    let store = MemoryWeightStore::new();
    // Two observations is well under the floor of ten; the population has
    // plenty of evidence that navy succeeds.
    store.seed(USER, TokenCategory::Color, "navy", 2, 0);
    store.seed_global(TokenCategory::Color, "navy", 40, 10);
    let weights = store
        .load_category(USER, TokenCategory::Color)
        .await
        .unwrap();

    let blended = weights.effective("navy", 10);
    let own = weights.user.get("navy").unwrap();
    assert!(blended.observations() > own.observations());
    // Enough personal history switches the blend off entirely.
    let warm = weights.effective("navy", 2);
    assert_eq!(warm.observations(), own.observations());
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

async fn compose_six() -> Vec<atelier_pipeline::composer::ComposedPrompt> {
    let composer = PromptComposer::new(Arc::new(MemoryWeightStore::new()), test_config());
    composer
        .compose_batch(USER, Uuid::new_v4(), &spec("jacket"), None, false, 0.7, false, 6, 100)
        .await
        .unwrap()
}

#[tokio::test]
async fn unit_failures_do_not_sink_the_batch() {
    let composed = compose_six().await;
    // Seeds are base + index, so these fail units 0 and 3.
    let provider = Arc::new(MockProvider::failing_seeds(vec![100, 103]));
    let orchestrator = Orchestrator::new(
        provider.clone(),
        Arc::new(MockStorage),
        Arc::new(EventBus::default()),
        test_config(),
    );

    let outcome = orchestrator
        .run(Uuid::new_v4(), USER, &composed, &CancellationToken::new())
        .await;

    assert_eq!(provider.calls(), 6);
    assert_eq!(outcome.completed.len(), 4);
    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(outcome.total_cost_cents, 4 * 4);
    assert!(!outcome.timed_out);

    let failed: Vec<usize> = outcome.failed.iter().map(|f| f.index).collect();
    assert!(failed.contains(&0) && failed.contains(&3));
}

#[tokio::test]
async fn cancellation_stops_issuing_units() {
    let composed = compose_six().await;
    let orchestrator = Orchestrator::new(
        Arc::new(MockProvider::new()),
        Arc::new(MockStorage),
        Arc::new(EventBus::default()),
        test_config(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = orchestrator.run(Uuid::new_v4(), USER, &composed, &cancel).await;

    assert!(outcome.completed.is_empty());
    assert!(outcome.failed.is_empty());
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

fn record(id: i64) -> CandidateRecord {
    CandidateRecord {
        generation_id: id,
        image_url: format!("https://cdn.test/{id}.png"),
        created_at: Utc::now(),
    }
}

fn target_for(garment: &str, aesthetic: Option<&str>) -> ValidationTarget {
    ValidationTarget {
        garment_type: garment.to_string(),
        tokens: Vec::new(),
        primary_aesthetic: aesthetic.map(str::to_string),
        secondary_aesthetics: Vec::new(),
    }
}

#[tokio::test]
async fn matching_candidate_is_accepted() {
    let analyst = Arc::new(MockAnalyst::returning(omniscient_attributes(
        "dress",
        "minimalist",
    )));
    let validator = Validator::new(analyst, test_config());

    let validation = validator
        .validate_candidate(&record(1), &target_for("dress", Some("minimalist")), 70.0)
        .await;

    assert_eq!(validation.decision, ValidationDecision::Accepted);
    assert!(validation.scores.overall_score >= 85.0);
}

#[tokio::test]
async fn unreachable_analyst_rejects_rather_than_accepts() {
    let validator = Validator::new(Arc::new(MockAnalyst::offline()), test_config());

    let validation = validator
        .validate_candidate(&record(2), &target_for("dress", None), 70.0)
        .await;

    assert_eq!(
        validation.decision,
        ValidationDecision::Rejected(REASON_VALIDATION_UNAVAILABLE.to_string())
    );
    assert!(!validation.returnable());
}

#[tokio::test]
async fn wrong_garment_lowers_consistency() {
    let analyst = Arc::new(MockAnalyst::returning(omniscient_attributes(
        "trench coat",
        "minimalist",
    )));
    let validator = Validator::new(analyst, test_config());

    let validation = validator
        .validate_candidate(&record(3), &target_for("dress", Some("minimalist")), 70.0)
        .await;

    assert!(validation.scores.consistency_score < 100.0);
}
