use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The adaptive generation engine.
    pub engine: Arc<atelier_pipeline::GenerationService>,
    /// Centralized event bus for publishing pipeline events.
    pub event_bus: Arc<atelier_events::EventBus>,
}
