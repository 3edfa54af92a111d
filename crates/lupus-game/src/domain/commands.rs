//! Commands accepted by the game engine.

use lupus_core::command::Command;
use lupus_core::id::{ParticipantId, VenueId};
use uuid::Uuid;

use super::distribution::RoleDistribution;

/// Command to set up and play a game in a venue.
#[derive(Debug, Clone)]
pub struct StartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Where the game is played.
    pub venue: VenueId,
    /// Everyone taking part, fixed for the whole game.
    pub roster: Vec<ParticipantId>,
    /// How many of each role to deal.
    pub distribution: RoleDistribution,
}

impl Command for StartGame {
    fn command_type(&self) -> &'static str {
        "game.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn venue(&self) -> VenueId {
        self.venue
    }
}

/// Command to abort the game running in a venue.
#[derive(Debug, Clone)]
pub struct CancelGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The venue whose game is cancelled.
    pub venue: VenueId,
}

impl Command for CancelGame {
    fn command_type(&self) -> &'static str {
        "game.cancel"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn venue(&self) -> VenueId {
        self.venue
    }
}
