//! Integration tests for the generation-side tables:
//! - Style profile versioning
//! - Brand DNA upsert
//! - Candidate lifecycle and batch accounting
//! - Validation results and the success baseline
//! - RLHF archive uniqueness

use sqlx::PgPool;
use uuid::Uuid;

use atelier_db::models::brand_dna::UpsertBrandDna;
use atelier_db::models::generation::{CandidateResult, CreateCandidate};
use atelier_db::models::prompt_artifact::CreatePromptArtifact;
use atelier_db::models::rlhf::CreateRlhfExample;
use atelier_db::models::style_profile::CreateStyleProfile;
use atelier_db::models::validation::CreateValidationResult;
use atelier_db::repositories::{
    BrandDnaRepo, GenerationRepo, PromptArtifactRepo, RlhfRepo, StyleProfileRepo, ValidationRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_profile(user_id: i64) -> CreateStyleProfile {
    CreateStyleProfile {
        user_id,
        images_analyzed: 25,
        overall_confidence: 0.8,
        profile_json: serde_json::json!({"aesthetics": []}),
    }
}

fn new_dna(user_id: i64, primary: &str) -> UpsertBrandDna {
    UpsertBrandDna {
        user_id,
        primary_aesthetic: primary.to_string(),
        secondary_aesthetics_json: serde_json::json!([]),
        signature_colors_json: serde_json::json!(["navy", "ivory", "black"]),
        signature_fabrics_json: serde_json::json!(["silk"]),
        signature_construction_json: serde_json::json!([]),
        photography_json: serde_json::json!({}),
        aesthetic_confidence: 0.7,
        overall_confidence: 0.75,
        drift_score: None,
    }
}

async fn seed_artifact(pool: &PgPool, batch_id: Uuid, user_id: i64) -> i64 {
    PromptArtifactRepo::insert(
        pool,
        &CreatePromptArtifact {
            batch_id,
            user_id,
            builder_variant: "standard".to_string(),
            positive_prompt: "navy silk slip dress".to_string(),
            negative_prompt: "blurry".to_string(),
            seed: 7,
            metadata_json: serde_json::json!({}),
            combination_key: "color:navy|fabric:silk".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_candidate(pool: &PgPool, batch_id: Uuid, user_id: i64) -> i64 {
    let artifact_id = seed_artifact(pool, batch_id, user_id).await;
    GenerationRepo::insert(
        pool,
        &CreateCandidate {
            batch_id,
            user_id,
            prompt_artifact_id: artifact_id,
        },
    )
    .await
    .unwrap()
    .id
}

fn validation(generation_id: i64, overall: f64, decision: &str) -> CreateValidationResult {
    CreateValidationResult {
        generation_id,
        consistency_score: overall,
        style_score: overall,
        outlier_score: 0.0,
        overall_score: overall,
        is_outlier: false,
        decision: decision.to_string(),
        rejection_reason: None,
        comparisons_json: serde_json::json!([]),
    }
}

// ---------------------------------------------------------------------------
// Style profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_versions_increment(pool: PgPool) {
    let v1 = StyleProfileRepo::insert(&pool, &new_profile(1)).await.unwrap();
    let v2 = StyleProfileRepo::insert(&pool, &new_profile(1)).await.unwrap();
    assert_eq!(v1.version, 1);
    assert_eq!(v2.version, 2);

    let latest = StyleProfileRepo::get_latest(&pool, 1).await.unwrap().unwrap();
    assert_eq!(latest.version, 2);

    // Another user starts at version 1.
    let other = StyleProfileRepo::insert(&pool, &new_profile(2)).await.unwrap();
    assert_eq!(other.version, 1);
}

// ---------------------------------------------------------------------------
// Brand DNA
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn brand_dna_upsert_replaces(pool: PgPool) {
    BrandDnaRepo::upsert(&pool, &new_dna(1, "minimalist")).await.unwrap();
    let updated = BrandDnaRepo::upsert(&pool, &new_dna(1, "romantic")).await.unwrap();
    assert_eq!(updated.primary_aesthetic, "romantic");

    // Still one row for the user.
    let current = BrandDnaRepo::get_by_user(&pool, 1).await.unwrap().unwrap();
    assert_eq!(current.id, updated.id);
    assert!(BrandDnaRepo::get_by_user(&pool, 2).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Candidate lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn candidate_lifecycle_and_batch_cost(pool: PgPool) {
    let batch_id = Uuid::new_v4();
    let first = seed_candidate(&pool, batch_id, 1).await;
    let second = seed_candidate(&pool, batch_id, 1).await;

    let completed = GenerationRepo::mark_completed(
        &pool,
        first,
        &CandidateResult {
            image_url: "https://cdn.example/img1.png".to_string(),
            storage_key: "img1.png".to_string(),
            provider: "flux".to_string(),
            cost_cents: 4,
        },
    )
    .await
    .unwrap();
    assert_eq!(completed.status, "completed");
    GenerationRepo::mark_failed(&pool, second, "provider timeout").await.unwrap();

    let counts = GenerationRepo::count_by_status(&pool, batch_id).await.unwrap();
    let done = counts.iter().find(|c| c.status == "completed").unwrap();
    let failed = counts.iter().find(|c| c.status == "failed").unwrap();
    assert_eq!(done.count, 1);
    assert_eq!(failed.count, 1);

    // Only successful calls accrue cost.
    assert_eq!(GenerationRepo::batch_cost_cents(&pool, batch_id).await.unwrap(), 4);

    // Terminal statuses never transition again.
    assert!(GenerationRepo::mark_failed(&pool, first, "late failure").await.is_err());
}

// ---------------------------------------------------------------------------
// Validation results
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn success_baseline_averages_accepted_only(pool: PgPool) {
    let batch_id = Uuid::new_v4();
    let a = seed_candidate(&pool, batch_id, 1).await;
    let b = seed_candidate(&pool, batch_id, 1).await;
    let c = seed_candidate(&pool, batch_id, 1).await;

    ValidationRepo::insert(&pool, &validation(a, 80.0, "accepted")).await.unwrap();
    ValidationRepo::insert(&pool, &validation(b, 90.0, "accepted")).await.unwrap();
    ValidationRepo::insert(&pool, &validation(c, 20.0, "rejected")).await.unwrap();

    let baseline = ValidationRepo::success_baseline(&pool, 1, 50).await.unwrap().unwrap();
    assert!((baseline - 85.0).abs() < 1e-9);

    // No history yet for another user.
    assert!(ValidationRepo::success_baseline(&pool, 2, 50).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revalidation_inserts_a_new_row_and_latest_wins(pool: PgPool) {
    let batch_id = Uuid::new_v4();
    let id = seed_candidate(&pool, batch_id, 1).await;

    let first = ValidationRepo::insert(&pool, &validation(id, 70.0, "accepted")).await.unwrap();
    let second = ValidationRepo::insert(&pool, &validation(id, 75.0, "accepted")).await.unwrap();
    assert_ne!(first.id, second.id);

    let latest = ValidationRepo::get_by_generation(&pool, id).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert!((latest.overall_score - 75.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// RLHF archive
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rlhf_archive_is_once_per_candidate(pool: PgPool) {
    let batch_id = Uuid::new_v4();
    let id = seed_candidate(&pool, batch_id, 1).await;

    let example = CreateRlhfExample {
        generation_id: id,
        user_id: 1,
        disposition: "neutral".to_string(),
        positive_prompt: "navy silk slip dress".to_string(),
        overall_score: 62.0,
        metadata_json: serde_json::json!({}),
    };
    let first = RlhfRepo::insert(&pool, &example).await.unwrap();
    let second = RlhfRepo::insert(&pool, &example).await.unwrap();
    assert_eq!(first.id, second.id);
    assert!(RlhfRepo::exists_for_generation(&pool, id).await.unwrap());

    let listed = RlhfRepo::list_by_user(&pool, 1, 10).await.unwrap();
    assert_eq!(listed.len(), 1);
}
