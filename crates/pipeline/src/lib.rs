//! The adaptive generation engine: prompt composition, over-generation
//! orchestration, candidate validation, and feedback learning.
//!
//! [`service::GenerationService`] wires the stages together over Postgres
//! and the external provider clients; the individual stages are usable
//! (and tested) against in-memory fakes.

pub mod composer;
pub mod config;
pub mod error;
pub mod learner;
pub mod orchestrator;
pub mod service;
pub mod store;
pub mod validator;

pub use config::EngineConfig;
pub use error::EngineError;
pub use service::GenerationService;
