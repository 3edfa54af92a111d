//! Mutable record of one game instance.

use std::collections::{BTreeMap, BTreeSet};

use lupus_core::catalog::{Faction, NightAbility, Role, Victory};
use lupus_core::clock::Clock;
use lupus_core::error::DomainError;
use lupus_core::event::EventMetadata;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::messaging::DeathCause;
use lupus_core::rng::DeterministicRng;
use serde::Serialize;
use uuid::Uuid;

use super::distribution::RoleDistribution;
use super::events::{
    Casualty, GameCancelled, GameEvent, GameEventKind, GameStarted, RolesAssigned,
    VictoryDeclared,
};

/// State-machine position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Roles dealt, play not started.
    Setup,
    /// Night actions are being collected.
    Night,
    /// Captain election and discussion.
    Day,
    /// The village vote is open.
    Voting,
    /// Terminal.
    Ended,
}

/// Single-use abilities, tracked for the whole session and never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OneShot {
    /// The witch's healing potion.
    HealPotion,
    /// The witch's poison potion.
    PoisonPotion,
    /// Cupid's binding.
    Bond,
}

/// Per-night scratch space, cleared when a night begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightActions {
    /// The pack's victim.
    pub pack_target: Option<ParticipantId>,
    /// Whoever the healing potion was spent on.
    pub healed: Option<ParticipantId>,
    /// Whoever the poison potion was spent on.
    pub poisoned: Option<ParticipantId>,
}

/// One game instance. Owned exclusively by the engine driving its venue.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    venue: VenueId,
    correlation_id: Uuid,
    roster: Vec<ParticipantId>,
    role_of: BTreeMap<ParticipantId, Role>,
    alive: BTreeSet<ParticipantId>,
    dead: BTreeSet<ParticipantId>,
    bonded_pair: Option<(ParticipantId, ParticipantId)>,
    tie_breaker: Option<ParticipantId>,
    tie_breaker_elected: bool,
    solo_winner: Option<ParticipantId>,
    phase: Phase,
    round: u32,
    votes: BTreeMap<ParticipantId, ParticipantId>,
    night_actions: NightActions,
    consumed: BTreeSet<OneShot>,
    history: Vec<GameEvent>,
}

impl Session {
    /// Creates a session from an already dealt role map. The roster is the
    /// map's key set.
    #[must_use]
    pub fn with_roles(
        venue: VenueId,
        roles: BTreeMap<ParticipantId, Role>,
        correlation_id: Uuid,
    ) -> Self {
        let roster: Vec<ParticipantId> = roles.keys().copied().collect();
        let solo_winner = roles
            .iter()
            .find(|(_, role)| role.faction() == Faction::Solo)
            .map(|(participant, _)| *participant);
        Self {
            id: Uuid::new_v4(),
            venue,
            correlation_id,
            alive: roster.iter().copied().collect(),
            dead: BTreeSet::new(),
            roster,
            role_of: roles,
            bonded_pair: None,
            tie_breaker: None,
            tie_breaker_elected: false,
            solo_winner,
            phase: Phase::Setup,
            round: 1,
            votes: BTreeMap::new(),
            night_actions: NightActions::default(),
            consumed: BTreeSet::new(),
            history: Vec::new(),
        }
    }

    /// Validates the setup and deals roles.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the roster or distribution is
    /// invalid. Nothing is dealt in that case.
    pub fn deal(
        venue: VenueId,
        roster: &[ParticipantId],
        distribution: &RoleDistribution,
        min_players: usize,
        correlation_id: Uuid,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        distribution.validate(roster, min_players)?;
        let roles = distribution.deal(roster, rng);
        let mut session = Self::with_roles(venue, roles, correlation_id);
        session.record(
            GameEventKind::GameStarted(GameStarted {
                venue,
                roster: roster.to_vec(),
            }),
            clock,
        );
        let roles = session.role_of.iter().map(|(p, r)| (*p, *r)).collect();
        session.record(GameEventKind::RolesAssigned(RolesAssigned { roles }), clock);
        Ok(session)
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Venue the session is played in.
    #[must_use]
    pub fn venue(&self) -> VenueId {
        self.venue
    }

    /// Correlation ID of the command that created the session.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Everyone taking part.
    #[must_use]
    pub fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    /// Role of `participant`.
    #[must_use]
    pub fn role_of(&self, participant: ParticipantId) -> Option<Role> {
        self.role_of.get(&participant).copied()
    }

    /// Living participants.
    #[must_use]
    pub fn alive(&self) -> &BTreeSet<ParticipantId> {
        &self.alive
    }

    /// Eliminated participants.
    #[must_use]
    pub fn dead(&self) -> &BTreeSet<ParticipantId> {
        &self.dead
    }

    /// Whether `participant` is still in play.
    #[must_use]
    pub fn is_alive(&self, participant: ParticipantId) -> bool {
        self.alive.contains(&participant)
    }

    /// Living participants whose role wakes up for `ability`.
    #[must_use]
    pub fn living_with_ability(&self, ability: NightAbility) -> Vec<ParticipantId> {
        self.alive
            .iter()
            .copied()
            .filter(|p| self.role_of(*p).and_then(Role::night_ability) == Some(ability))
            .collect()
    }

    /// Living participants in `faction`, ascending.
    #[must_use]
    pub fn living_members(&self, faction: Faction) -> Vec<ParticipantId> {
        self.alive
            .iter()
            .copied()
            .filter(|p| self.role_of(*p).map(Role::faction) == Some(faction))
            .collect()
    }

    /// Number of living participants in `faction`.
    #[must_use]
    pub fn living_in_faction(&self, faction: Faction) -> usize {
        self.alive
            .iter()
            .filter(|p| self.role_of(**p).map(Role::faction) == Some(faction))
            .count()
    }

    /// The bonded pair, once formed.
    #[must_use]
    pub fn bonded_pair(&self) -> Option<(ParticipantId, ParticipantId)> {
        self.bonded_pair
    }

    /// The other member of the bonded pair, if `participant` is in it.
    #[must_use]
    pub fn partner_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        match self.bonded_pair {
            Some((a, b)) if a == participant => Some(b),
            Some((a, b)) if b == participant => Some(a),
            _ => None,
        }
    }

    /// The elected tie-breaker.
    #[must_use]
    pub fn tie_breaker(&self) -> Option<ParticipantId> {
        self.tie_breaker
    }

    /// Whether the captain election already happened.
    #[must_use]
    pub fn tie_breaker_elected(&self) -> bool {
        self.tie_breaker_elected
    }

    /// Participant whose solo condition is still live.
    #[must_use]
    pub fn solo_winner(&self) -> Option<ParticipantId> {
        self.solo_winner
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round, starting at 1.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Ballots of the current voting step.
    #[must_use]
    pub fn votes(&self) -> &BTreeMap<ParticipantId, ParticipantId> {
        &self.votes
    }

    /// This night's scratch space.
    #[must_use]
    pub fn night_actions(&self) -> &NightActions {
        &self.night_actions
    }

    /// Whether a single-use ability has been spent.
    #[must_use]
    pub fn is_consumed(&self, ability: OneShot) -> bool {
        self.consumed.contains(&ability)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    /// Moves the session into a new night.
    pub fn begin_night(&mut self) {
        self.phase = Phase::Night;
        self.night_actions = NightActions::default();
    }

    /// Moves the session into the day.
    pub fn begin_day(&mut self) {
        self.phase = Phase::Day;
    }

    /// Opens the village vote with an empty ballot box.
    pub fn begin_voting(&mut self) {
        self.phase = Phase::Voting;
        self.votes.clear();
    }

    /// Advances to the next round.
    pub fn next_round(&mut self) {
        self.round += 1;
    }

    /// Records the pack's victim for this night.
    pub fn set_pack_target(&mut self, target: Option<ParticipantId>) {
        self.night_actions.pack_target = target;
    }

    /// Spends the healing potion on `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the potion is spent or `target`
    /// is not tonight's pack victim.
    pub fn heal(&mut self, target: ParticipantId) -> Result<(), DomainError> {
        if self.night_actions.pack_target != Some(target) {
            return Err(DomainError::Validation(format!(
                "{target} is not tonight's victim"
            )));
        }
        self.consume(OneShot::HealPotion)?;
        self.night_actions.healed = Some(target);
        Ok(())
    }

    /// Spends the poison potion on `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the potion is spent or `target`
    /// is not alive.
    pub fn poison(&mut self, target: ParticipantId) -> Result<(), DomainError> {
        if !self.is_alive(target) {
            return Err(DomainError::Validation(format!("{target} is not alive")));
        }
        self.consume(OneShot::PoisonPotion)?;
        self.night_actions.poisoned = Some(target);
        Ok(())
    }

    /// Forms the bonded pair.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the pair was already formed or
    /// the two members are not distinct living participants.
    pub fn bond(&mut self, first: ParticipantId, second: ParticipantId) -> Result<(), DomainError> {
        if first == second || !self.is_alive(first) || !self.is_alive(second) {
            return Err(DomainError::Validation(
                "a bonded pair needs two distinct living participants".to_owned(),
            ));
        }
        self.consume(OneShot::Bond)?;
        self.bonded_pair = Some((first, second));
        Ok(())
    }

    /// Settles the captain election. Runs once per session.
    pub fn elect_tie_breaker(&mut self, captain: Option<ParticipantId>) {
        self.tie_breaker = captain;
        self.tie_breaker_elected = true;
    }

    /// Records a village ballot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` outside the voting phase, for dead
    /// voters or targets, or for self-votes.
    pub fn cast_vote(
        &mut self,
        voter: ParticipantId,
        target: ParticipantId,
    ) -> Result<(), DomainError> {
        if self.phase != Phase::Voting {
            return Err(DomainError::Validation("voting is not open".to_owned()));
        }
        if voter == target || !self.is_alive(voter) || !self.is_alive(target) {
            return Err(DomainError::Validation(format!(
                "ballot {voter} -> {target} is not allowed"
            )));
        }
        self.votes.insert(voter, target);
        Ok(())
    }

    /// Moves `participant` from alive to dead. Returns whether anything
    /// changed; a second call is a no-op.
    pub fn apply_casualty(&mut self, participant: ParticipantId) -> bool {
        if !self.alive.remove(&participant) {
            return false;
        }
        self.votes.remove(&participant);
        self.dead.insert(participant);
        true
    }

    /// Applies one batch of primary casualties and the bonded-pair cascade.
    ///
    /// The batch is fixed before any mutation. Once every member is applied,
    /// partners of the newly dead follow them. A partner never cascades
    /// further. Entries for participants already dead are dropped.
    pub fn apply_batch(&mut self, batch: &[(ParticipantId, DeathCause)]) -> Vec<Casualty> {
        let mut casualties = Vec::new();
        for (participant, cause) in batch {
            if self.apply_casualty(*participant) {
                casualties.push(self.casualty(*participant, *cause));
            }
        }

        let fallen: Vec<ParticipantId> = casualties.iter().map(|c| c.participant).collect();
        for participant in fallen {
            if let Some(partner) = self.partner_of(participant) {
                if self.apply_casualty(partner) {
                    casualties.push(self.casualty(partner, DeathCause::Heartbreak));
                }
            }
        }
        casualties
    }

    /// Primary casualties of the night: the pack's victim unless healed,
    /// plus the poisoned participant.
    #[must_use]
    pub fn night_batch(&self) -> Vec<(ParticipantId, DeathCause)> {
        let actions = &self.night_actions;
        let mut batch = Vec::new();
        if let Some(victim) = actions.pack_target {
            if actions.healed != Some(victim) {
                batch.push((victim, DeathCause::Pack));
            }
        }
        if let Some(poisoned) = actions.poisoned {
            if !batch.iter().any(|(p, _)| *p == poisoned) {
                batch.push((poisoned, DeathCause::Poison));
            }
        }
        batch
    }

    /// Settles the solo condition after a voting step. Only the first call
    /// can produce a win; the condition is cleared either way.
    pub fn settle_solo(&mut self, eliminated: Option<ParticipantId>) -> Option<Victory> {
        let solo = self.solo_winner.take()?;
        (eliminated == Some(solo)).then_some(Victory::Solo(solo))
    }

    /// Ends the session with a winner.
    pub fn end(&mut self, victory: Victory, clock: &dyn Clock) {
        self.phase = Phase::Ended;
        self.record(
            GameEventKind::VictoryDeclared(VictoryDeclared {
                victory,
                round: self.round,
            }),
            clock,
        );
    }

    /// Ends the session without evaluating victory.
    pub fn cancel(&mut self, clock: &dyn Clock) {
        self.phase = Phase::Ended;
        self.record(
            GameEventKind::GameCancelled(GameCancelled { round: self.round }),
            clock,
        );
    }

    /// Appends an event to the history.
    pub fn record(&mut self, kind: GameEventKind, clock: &dyn Clock) {
        let event = GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.id,
                venue: self.venue,
                round: self.round,
                sequence_number: self.history.len() as u64 + 1,
                correlation_id: self.correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.history.push(event);
    }

    fn consume(&mut self, ability: OneShot) -> Result<(), DomainError> {
        if !self.consumed.insert(ability) {
            return Err(DomainError::Validation(format!("{ability:?} already used")));
        }
        Ok(())
    }

    fn casualty(&self, participant: ParticipantId, cause: DeathCause) -> Casualty {
        Casualty {
            participant,
            role: self.role_of(participant).unwrap_or(Role::Villager),
            cause,
        }
    }
}
