//! Commands addressed to a venue.

use uuid::Uuid;

use crate::id::VenueId;

/// A request aimed at the session of one venue.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name used in logs, e.g. `game.start`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried by every event the command causes.
    fn correlation_id(&self) -> Uuid;

    /// The venue whose session the command targets.
    fn venue(&self) -> VenueId;
}
