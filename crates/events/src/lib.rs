//! Atelier pipeline event infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PipelineEvent`] — the canonical engine event envelope, emitted as
//!   batches progress through composition, generation, and validation.

pub mod bus;

pub use bus::{EventBus, PipelineEvent};
