//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod brand_dna;
pub mod feedback;
pub mod generation;
pub mod prompt_artifact;
pub mod rlhf;
pub mod style_profile;
pub mod token_weight;
pub mod validation;
