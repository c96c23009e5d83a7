//! Engine-level error type.

use atelier_core::CoreError;

/// Errors surfaced by the pipeline stages.
///
/// Provider failures never appear here: they are isolated per candidate
/// and recorded on the affected unit instead of failing the batch.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl EngineError {
    /// Convenience constructor for request validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Core(CoreError::Validation(message.into()))
    }

    /// Convenience constructor for missing-entity failures.
    pub fn not_found(entity: &'static str, id: atelier_core::types::DbId) -> Self {
        EngineError::Core(CoreError::NotFound { entity, id })
    }
}
