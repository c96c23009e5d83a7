//! External service clients: image generation, visual analysis, and
//! object storage.
//!
//! Each service is exposed as a trait so the pipeline can be exercised
//! against in-memory fakes; the `Http*` implementations wrap the real
//! REST endpoints using [`reqwest`].

pub mod analyst;
pub mod error;
pub mod generation;
pub mod storage;

pub use analyst::{HttpVisualAnalyst, VisualAnalyst};
pub use error::ProviderError;
pub use generation::{GeneratedImage, GenerationProvider, GenerationRequest, HttpGenerationProvider};
pub use storage::{HttpObjectStorage, ObjectStorage, StoredObject};
