//! Domain error types.

use thiserror::Error;

use crate::id::{ParticipantId, VenueId};

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No game session is registered for the venue.
    #[error("no session running in venue {0}")]
    SessionNotFound(VenueId),

    /// A game session is already registered for the venue.
    #[error("a session is already running in venue {0}")]
    SessionAlreadyRunning(VenueId),

    /// The session was cancelled before it could finish.
    #[error("session in venue {0} was cancelled")]
    Cancelled(VenueId),

    /// A participant cannot receive private prompts.
    #[error("participant {0} cannot receive private prompts")]
    Unreachable(ParticipantId),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/collaborator error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
