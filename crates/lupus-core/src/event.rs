//! Game history events.
//!
//! A session keeps its events in memory, in the order they happened. The
//! history is handed back when the session ends and is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::VenueId;

/// Envelope shared by every recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Dotted type name, e.g. `game.casualties_applied`.
    pub event_type: String,
    /// Game session this event belongs to.
    pub session_id: Uuid,
    /// Venue the session is played in.
    pub venue: VenueId,
    /// Round during which the event happened. Setup events carry round 1.
    pub round: u32,
    /// Position within the session history, starting at 1.
    pub sequence_number: u64,
    /// Correlation ID of the command that started the session.
    pub correlation_id: Uuid,
    /// Wall-clock stamp from the injected clock.
    pub occurred_at: DateTime<Utc>,
}

/// An entry of a session's history.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Dotted type name.
    fn event_type(&self) -> &'static str;

    /// The event-specific fields as JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope.
    fn metadata(&self) -> &EventMetadata;
}
