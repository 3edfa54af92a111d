//! Query handlers for live sessions.
//!
//! Views are snapshots published by the engine after every phase
//! transition; hidden information (roles, the bonded pair) is never exposed.

use lupus_core::error::DomainError;
use lupus_core::id::{ParticipantId, VenueId};
use serde::Serialize;
use uuid::Uuid;

use super::store::SessionStore;
use crate::domain::session::{Phase, Session};

/// Read-only public view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The session identifier, once roles are dealt.
    pub session_id: Option<Uuid>,
    /// Where the session is played.
    pub venue: VenueId,
    /// Current phase.
    pub phase: Phase,
    /// Current round.
    pub round: u32,
    /// Living participants.
    pub alive: Vec<ParticipantId>,
    /// Eliminated participants.
    pub dead: Vec<ParticipantId>,
    /// The elected tie-breaker.
    pub tie_breaker: Option<ParticipantId>,
}

impl SessionView {
    /// View of a venue whose session is still being set up.
    #[must_use]
    pub fn pending(venue: VenueId) -> Self {
        Self {
            session_id: None,
            venue,
            phase: Phase::Setup,
            round: 0,
            alive: Vec::new(),
            dead: Vec::new(),
            tie_breaker: None,
        }
    }
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: Some(session.id()),
            venue: session.venue(),
            phase: session.phase(),
            round: session.round(),
            alive: session.alive().iter().copied().collect(),
            dead: session.dead().iter().copied().collect(),
            tie_breaker: session.tie_breaker(),
        }
    }
}

/// Retrieves the live view of the session in `venue`.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no session runs in the venue.
/// Returns `DomainError::Infrastructure` if the store lock is poisoned.
pub fn get_session_status(
    venue: VenueId,
    store: &SessionStore,
) -> Result<SessionView, DomainError> {
    store.view(venue)
}
