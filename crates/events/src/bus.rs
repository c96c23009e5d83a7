//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PipelineEvent`]s. It is
//! shared via `Arc<EventBus>` between the pipeline service and any
//! listeners (progress reporting, logging).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use atelier_core::types::DbId;

// ---------------------------------------------------------------------------
// PipelineEvent
// ---------------------------------------------------------------------------

/// Event names emitted by the engine.
pub mod event_types {
    pub const BATCH_STARTED: &str = "batch.started";
    pub const CANDIDATE_GENERATED: &str = "candidate.generated";
    pub const CANDIDATE_FAILED: &str = "candidate.failed";
    pub const BATCH_VALIDATED: &str = "batch.validated";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const FEEDBACK_RECORDED: &str = "feedback.recorded";
    pub const WEIGHTS_UPDATED: &str = "weights.updated";
}

/// A domain event emitted while a batch moves through the engine.
///
/// Constructed via [`PipelineEvent::new`] and enriched with the builder
/// methods [`for_batch`](PipelineEvent::for_batch),
/// [`for_user`](PipelineEvent::for_user), and
/// [`with_payload`](PipelineEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Dot-separated event name, e.g. `"candidate.generated"`.
    pub event_type: String,

    /// Batch this event belongs to, when batch-scoped.
    pub batch_id: Option<Uuid>,

    /// User whose request produced the event.
    pub user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            batch_id: None,
            user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the batch id to the event.
    pub fn for_batch(mut self, batch_id: Uuid) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Attach the requesting user to the event.
    pub fn for_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PipelineEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// progress events are advisory and never block the pipeline.
    pub fn publish(&self, event: PipelineEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
