//! Game engine: setup preconditions and the night/day loop.

use std::sync::Arc;

use lupus_core::catalog::{Faction, Victory};
use lupus_core::clock::Clock;
use lupus_core::error::DomainError;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::messaging::{
    Announcement, Messenger, MessengerError, Named, NamedCasualty, Notice,
};
use lupus_core::rng::DeterministicRng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::collector::ActionCollector;
use super::config::GameConfig;
use super::store::SessionTicket;
use crate::domain::commands::StartGame;
use crate::domain::events::{Casualty, GameEvent};
use crate::domain::session::Session;
use crate::domain::victory::{evaluate_victory, winners};

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Someone won.
    Victory(Victory),
    /// The session was cancelled from outside.
    Cancelled,
}

/// Summary handed back once a session is over.
#[derive(Debug, Clone)]
pub struct GameReport {
    /// The finished session.
    pub session_id: Uuid,
    /// Where it was played.
    pub venue: VenueId,
    /// How it ended.
    pub outcome: GameOutcome,
    /// Round in which it ended.
    pub rounds: u32,
    /// Participants credited with the win.
    pub winners: Vec<ParticipantId>,
    /// Participants still alive at the end.
    pub survivors: Vec<ParticipantId>,
    /// Full event history.
    pub history: Vec<GameEvent>,
}

/// Drives one venue's game from setup to a terminal outcome.
pub struct GameEngine {
    pub(crate) messenger: Arc<dyn Messenger>,
    pub(crate) collector: ActionCollector,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) rng: Box<dyn DeterministicRng>,
    pub(crate) config: GameConfig,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Creates an engine over its collaborators.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
        config: GameConfig,
    ) -> Self {
        Self {
            collector: ActionCollector::new(Arc::clone(&messenger)),
            messenger,
            clock,
            rng,
            config,
        }
    }

    /// Validates the roster, checks every participant can be prompted
    /// privately, then deals roles and tells each participant theirs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an invalid roster or
    /// distribution and `DomainError::Unreachable` for the first participant
    /// that cannot be prompted. No role is dealt or revealed in either case.
    #[instrument(skip_all, fields(venue = %command.venue, players = command.roster.len()))]
    pub async fn setup(&mut self, command: &StartGame) -> Result<Session, DomainError> {
        command
            .distribution
            .validate(&command.roster, self.config.min_players)?;

        for &participant in &command.roster {
            if let Err(error) = self.messenger.check_reachable(participant).await {
                warn!(%participant, %error, "participant cannot be prompted privately");
                return Err(match error {
                    MessengerError::Unreachable(p) => DomainError::Unreachable(p),
                    MessengerError::Delivery(_) => DomainError::Unreachable(participant),
                });
            }
        }

        let session = Session::deal(
            command.venue,
            &command.roster,
            &command.distribution,
            self.config.min_players,
            command.correlation_id,
            self.rng.as_mut(),
            self.clock.as_ref(),
        )?;
        info!(session_id = %session.id(), "roles dealt");

        let pack = session.living_members(Faction::Wolves);
        for &participant in session.roster() {
            let Some(role) = session.role_of(participant) else {
                continue;
            };
            self.notify(participant, Notice::RoleAssigned { role }).await;
            if role.faction() == Faction::Wolves && pack.len() > 1 {
                let mates = pack.iter().copied().filter(|p| *p != participant).collect();
                self.notify(participant, Notice::PackMates { mates }).await;
            }
        }

        let mut players = Vec::with_capacity(session.roster().len());
        for &participant in session.roster() {
            players.push(self.named(participant).await);
        }
        self.announce(session.venue(), Announcement::GameStarted { players })
            .await;
        Ok(session)
    }

    /// Plays `session` until a victory or until `ticket` is cancelled.
    ///
    /// Cancellation drops whatever wait is in flight and ends the session
    /// without evaluating victory.
    #[instrument(
        skip_all,
        fields(
            venue = %session.venue(),
            session_id = %session.id(),
            correlation_id = %session.correlation_id(),
        )
    )]
    pub async fn run(&mut self, mut session: Session, ticket: &SessionTicket) -> GameReport {
        ticket.publish(&session);

        let finished = tokio::select! {
            victory = self.play(&mut session, ticket) => Some(victory),
            () = ticket.cancelled() => None,
        };

        let outcome = match finished {
            Some(victory) => {
                session.end(victory, self.clock.as_ref());
                info!(?victory, round = session.round(), "game over");
                let mut named = Vec::new();
                for participant in winners(&session, victory) {
                    named.push(self.named(participant).await);
                }
                self.announce(
                    session.venue(),
                    Announcement::GameOver {
                        victory,
                        winners: named,
                    },
                )
                .await;
                GameOutcome::Victory(victory)
            }
            None => {
                session.cancel(self.clock.as_ref());
                info!(round = session.round(), "game cancelled");
                self.announce(session.venue(), Announcement::Cancelled).await;
                GameOutcome::Cancelled
            }
        };
        ticket.publish(&session);

        GameReport {
            session_id: session.id(),
            venue: session.venue(),
            outcome,
            rounds: session.round(),
            winners: match outcome {
                GameOutcome::Victory(victory) => winners(&session, victory),
                GameOutcome::Cancelled => Vec::new(),
            },
            survivors: session.alive().iter().copied().collect(),
            history: session.history().to_vec(),
        }
    }

    async fn play(&mut self, session: &mut Session, ticket: &SessionTicket) -> Victory {
        loop {
            self.run_night(session, ticket).await;
            ticket.publish(session);
            if let Some(victory) = evaluate_victory(session) {
                return victory;
            }

            let solo = self.run_day(session, ticket).await;
            ticket.publish(session);
            if let Some(victory) = solo.or_else(|| evaluate_victory(session)) {
                return victory;
            }
            session.next_round();
        }
    }

    pub(crate) async fn announce(&self, venue: VenueId, announcement: Announcement) {
        if let Err(error) = self.messenger.broadcast(venue, announcement).await {
            warn!(%venue, %error, "broadcast failed");
        }
    }

    pub(crate) async fn notify(&self, participant: ParticipantId, notice: Notice) {
        if let Err(error) = self.messenger.notify_privately(participant, notice).await {
            warn!(%participant, %error, "private notice failed");
        }
    }

    pub(crate) async fn named(&self, participant: ParticipantId) -> Named {
        Named {
            participant,
            name: self.messenger.resolve_identity(participant).await,
        }
    }

    pub(crate) async fn announce_casualties(&self, session: &Session, casualties: &[Casualty]) {
        let announcement = if casualties.is_empty() {
            Announcement::NoCasualties {
                round: session.round(),
            }
        } else {
            let mut named = Vec::with_capacity(casualties.len());
            for casualty in casualties {
                named.push(NamedCasualty {
                    who: self.named(casualty.participant).await,
                    role: casualty.role,
                    cause: casualty.cause,
                });
            }
            Announcement::Casualties {
                round: session.round(),
                casualties: named,
            }
        };
        self.announce(session.venue(), announcement).await;
    }
}
