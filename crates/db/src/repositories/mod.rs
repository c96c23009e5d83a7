//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod brand_dna_repo;
pub mod feedback_repo;
pub mod generation_repo;
pub mod prompt_artifact_repo;
pub mod rlhf_repo;
pub mod style_profile_repo;
pub mod token_weight_repo;
pub mod validation_repo;

pub use brand_dna_repo::BrandDnaRepo;
pub use feedback_repo::FeedbackRepo;
pub use generation_repo::GenerationRepo;
pub use prompt_artifact_repo::PromptArtifactRepo;
pub use rlhf_repo::RlhfRepo;
pub use style_profile_repo::StyleProfileRepo;
pub use token_weight_repo::TokenWeightRepo;
pub use validation_repo::ValidationRepo;
