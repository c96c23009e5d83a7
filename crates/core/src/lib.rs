//! Pure domain logic for the Atelier generation engine.
//!
//! Everything in this crate is synchronous and I/O-free: bandit math,
//! brand-DNA projection, prompt assembly, traffic routing, over-generation
//! arithmetic, validation scoring, and feedback mapping. Persistence lives
//! in `atelier-db`; orchestration lives in `atelier-pipeline`.

pub mod bandit;
pub mod brand_dna;
pub mod error;
pub mod feedback;
pub mod overgen;
pub mod profile;
pub mod prompt;
pub mod routing;
pub mod scoring;
pub mod token;
pub mod types;

pub use error::CoreError;
