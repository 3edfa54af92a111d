//! Collaborator port through which the engine reaches participants.
//!
//! The engine never knows how prompts travel. A chat-platform adapter, the
//! play-test bots and the scripted test double all implement [`Messenger`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Role, Victory};
use crate::id::{ParticipantId, VenueId};

/// Failure reported by a [`Messenger`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessengerError {
    /// The participant cannot receive private prompts at all.
    #[error("participant {0} is unreachable")]
    Unreachable(ParticipantId),

    /// Delivery failed for a transient or unknown reason.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// What a private prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    /// Pick the two participants of the bonded pair.
    Bond,
    /// Pick the pack's victim.
    PackVote,
    /// Pick whose role to learn.
    Reveal,
    /// Heal the victim, poison someone, or pass.
    Potions,
    /// Elect the tie-breaker.
    CaptainElection,
    /// Vote someone out.
    VillageVote,
    /// Settle a tied village vote.
    TieBreak,
    /// Take one more participant down on the way out.
    PosthumousStrike,
}

/// One selectable answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// Designates a participant.
    Target(ParticipantId),
    /// Spends the healing potion on the pack's victim.
    Heal(ParticipantId),
    /// Spends the poison potion on a participant.
    Poison(ParticipantId),
    /// Binds two participants.
    Bond(ParticipantId, ParticipantId),
    /// Declines to act.
    Pass,
}

impl Choice {
    /// Participant designated by a single-target choice.
    #[must_use]
    pub fn target(&self) -> Option<ParticipantId> {
        match self {
            Self::Target(p) | Self::Heal(p) | Self::Poison(p) => Some(*p),
            Self::Bond(..) | Self::Pass => None,
        }
    }
}

/// A private decision request. Answers outside `choices` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// What is being asked.
    pub kind: PromptKind,
    /// The closed set of acceptable answers.
    pub choices: Vec<Choice>,
    /// Whether a requester may not designate themselves.
    pub exclude_self: bool,
}

impl Prompt {
    /// Creates a prompt over `choices`.
    #[must_use]
    pub fn new(kind: PromptKind, choices: Vec<Choice>) -> Self {
        Self {
            kind,
            choices,
            exclude_self: false,
        }
    }

    /// Forbids requesters from designating themselves.
    #[must_use]
    pub fn excluding_self(mut self) -> Self {
        self.exclude_self = true;
        self
    }

    /// Whether `requester` may answer with `choice`.
    #[must_use]
    pub fn accepts(&self, requester: ParticipantId, choice: &Choice) -> bool {
        if self.exclude_self && choice.target() == Some(requester) {
            return false;
        }
        self.choices.contains(choice)
    }

    /// Choices open to `requester`.
    #[must_use]
    pub fn choices_for(&self, requester: ParticipantId) -> Vec<Choice> {
        self.choices
            .iter()
            .copied()
            .filter(|choice| self.accepts(requester, choice))
            .collect()
    }
}

/// Private information pushed to a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Tells a participant their role.
    RoleAssigned { role: Role },
    /// Tells a wolf who the rest of the pack is.
    PackMates { mates: Vec<ParticipantId> },
    /// Result of a reveal.
    Revealed { target: ParticipantId, role: Role },
    /// Tells a bonded participant who their partner is.
    Bonded { partner: ParticipantId },
}

/// A participant named for public display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    /// The participant.
    pub participant: ParticipantId,
    /// Display name from [`Messenger::resolve_identity`].
    pub name: String,
}

/// Why a participant left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Killed by the pack.
    Pack,
    /// Poisoned by the witch.
    Poison,
    /// Voted out by the village.
    Vote,
    /// Followed their bonded partner.
    Heartbreak,
    /// Hit by a posthumous strike.
    Strike,
}

/// A public casualty announcement entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCasualty {
    /// Who died.
    pub who: Named,
    /// Their role, revealed on death.
    pub role: Role,
    /// How they died.
    pub cause: DeathCause,
}

/// Public announcement sent to the whole venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    /// The game started with this many players.
    GameStarted { players: Vec<Named> },
    /// A night begins.
    NightFalls { round: u32 },
    /// Casualties of a step.
    Casualties { round: u32, casualties: Vec<NamedCasualty> },
    /// A step ended without casualties.
    NoCasualties { round: u32 },
    /// Outcome of the captain election.
    CaptainElected { captain: Option<Named> },
    /// Discussion opens for the given duration.
    DiscussionOpened { round: u32, duration: Duration },
    /// The village vote opens.
    VotingOpened { round: u32 },
    /// The vote is tied between these participants.
    VoteTied { tied: Vec<Named> },
    /// The game is over.
    GameOver { victory: Victory, winners: Vec<Named> },
    /// The game was cancelled.
    Cancelled,
}

/// Operations the engine needs from the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Fails fast when `participant` cannot receive private prompts at all.
    async fn check_reachable(&self, participant: ParticipantId) -> Result<(), MessengerError>;

    /// Delivers a private decision prompt. `Ok(None)` means no answer arrived
    /// before `deadline`.
    async fn prompt_privately(
        &self,
        participant: ParticipantId,
        prompt: Prompt,
        deadline: Duration,
    ) -> Result<Option<Choice>, MessengerError>;

    /// Delivers private information. No answer is expected.
    async fn notify_privately(
        &self,
        participant: ParticipantId,
        notice: Notice,
    ) -> Result<(), MessengerError>;

    /// Delivers a public announcement. No answer is expected.
    async fn broadcast(
        &self,
        venue: VenueId,
        announcement: Announcement,
    ) -> Result<(), MessengerError>;

    /// Display name for announcements. Never used for game logic.
    async fn resolve_identity(&self, participant: ParticipantId) -> String;
}
