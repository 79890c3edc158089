//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Events are published only after the unit of work that produced them has
//! committed, so subscribers never observe rolled-back state.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sowcycle_core::types::{DbId, Timestamp};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const BREEDING_MATED: &str = "breeding.mated";
pub const BREEDING_BIRTH_RECORDED: &str = "breeding.birth_recorded";
pub const BREEDING_DELETED: &str = "breeding.deleted";
pub const CULLING_FLAGGED: &str = "culling.flagged";
pub const LITTER_REGISTERED: &str = "litter.registered";

// ---------------------------------------------------------------------------
// FarmEvent
// ---------------------------------------------------------------------------

/// Something that happened to a pig or breeding record on a farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmEvent {
    /// Dot-separated event name, e.g. `"breeding.mated"`.
    pub event_type: String,
    pub farm_id: DbId,
    /// The sow (or other pig) the event is about.
    pub pig_id: Option<DbId>,
    pub breeding_record_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    /// Event-specific data.
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl FarmEvent {
    pub fn new(event_type: impl Into<String>, farm_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            farm_id,
            pig_id: None,
            breeding_record_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_pig(mut self, pig_id: DbId) -> Self {
        self.pig_id = Some(pig_id);
        self
    }

    pub fn with_record(mut self, breeding_record_id: DbId) -> Self {
        self.breeding_record_id = Some(breeding_record_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<FarmEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: FarmEvent) {
        tracing::debug!(
            event_type = %event.event_type,
            farm_id = event.farm_id,
            subscribers = self.sender.receiver_count(),
            "Publishing farm event"
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FarmEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
