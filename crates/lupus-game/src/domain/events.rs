//! Domain events recorded in a session's in-memory history.

use lupus_core::catalog::{Role, Victory};
use lupus_core::event::{DomainEvent, EventMetadata};
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::messaging::{Choice, DeathCause};
use serde::{Deserialize, Serialize};

/// Emitted once the roster has been validated and roles dealt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStarted {
    /// Where the game is played.
    pub venue: VenueId,
    /// Everyone taking part.
    pub roster: Vec<ParticipantId>,
}

/// Emitted with the full role map right after dealing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesAssigned {
    /// Participant → role.
    pub roles: Vec<(ParticipantId, Role)>,
}

/// Emitted when the bonded pair is formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairBonded {
    /// First member.
    pub first: ParticipantId,
    /// Second member.
    pub second: ParticipantId,
}

/// Emitted after the pack vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackTargetChosen {
    /// Ballots in arrival order.
    pub ballots: Vec<(ParticipantId, ParticipantId)>,
    /// Selected victim, if anyone voted.
    pub target: Option<ParticipantId>,
}

/// Emitted when a reveal was delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeerRevealed {
    /// Who looked.
    pub seer: ParticipantId,
    /// Who was looked at.
    pub target: ParticipantId,
}

/// Emitted when a one-shot potion is spent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotionUsed {
    /// Who used it.
    pub witch: ParticipantId,
    /// `Heal` or `Poison`, with its target.
    pub choice: Choice,
}

/// Emitted after the captain election.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptainElected {
    /// The elected tie-breaker, if anyone voted.
    pub captain: Option<ParticipantId>,
}

/// Emitted after the village vote is counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteTallied {
    /// Ballots in arrival order.
    pub ballots: Vec<(ParticipantId, ParticipantId)>,
    /// Participants sharing the highest count.
    pub leaders: Vec<ParticipantId>,
}

/// Emitted when a tied vote is settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieBroken {
    /// The tied participants.
    pub tied: Vec<ParticipantId>,
    /// Who was selected.
    pub chosen: ParticipantId,
    /// Whether the captain chose, as opposed to a random draw.
    pub by_captain: bool,
}

/// One entry of a casualty step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    /// Who died.
    pub participant: ParticipantId,
    /// Their role.
    pub role: Role,
    /// How they died.
    pub cause: DeathCause,
}

/// Emitted once per casualty step, cascades included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasualtiesApplied {
    /// Round of the step.
    pub round: u32,
    /// Everyone removed from play by the step, in order.
    pub casualties: Vec<Casualty>,
}

/// Emitted when the session ends with a winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VictoryDeclared {
    /// The outcome.
    pub victory: Victory,
    /// Round in which the game ended.
    pub round: u32,
}

/// Emitted when the session is cancelled from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCancelled {
    /// Round in which the game was cancelled.
    pub round: u32,
}

/// Event payload variants for a game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEventKind {
    /// The game started.
    GameStarted(GameStarted),
    /// Roles were dealt.
    RolesAssigned(RolesAssigned),
    /// The bonded pair was formed.
    PairBonded(PairBonded),
    /// The pack picked a victim.
    PackTargetChosen(PackTargetChosen),
    /// The seer learned a role.
    SeerRevealed(SeerRevealed),
    /// The witch spent a potion.
    PotionUsed(PotionUsed),
    /// The tie-breaker was elected.
    CaptainElected(CaptainElected),
    /// The village vote was counted.
    VoteTallied(VoteTallied),
    /// A tie was settled.
    TieBroken(TieBroken),
    /// A casualty step completed.
    CasualtiesApplied(CasualtiesApplied),
    /// Someone won.
    VictoryDeclared(VictoryDeclared),
    /// The game was cancelled.
    GameCancelled(GameCancelled),
}

impl GameEventKind {
    /// Event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted(_) => "game.started",
            Self::RolesAssigned(_) => "game.roles_assigned",
            Self::PairBonded(_) => "game.pair_bonded",
            Self::PackTargetChosen(_) => "game.pack_target_chosen",
            Self::SeerRevealed(_) => "game.seer_revealed",
            Self::PotionUsed(_) => "game.potion_used",
            Self::CaptainElected(_) => "game.captain_elected",
            Self::VoteTallied(_) => "game.vote_tallied",
            Self::TieBroken(_) => "game.tie_broken",
            Self::CasualtiesApplied(_) => "game.casualties_applied",
            Self::VictoryDeclared(_) => "game.victory_declared",
            Self::GameCancelled(_) => "game.cancelled",
        }
    }
}

/// Domain event envelope for a game session.
#[derive(Debug, Clone)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl DomainEvent for GameEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("GameEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
