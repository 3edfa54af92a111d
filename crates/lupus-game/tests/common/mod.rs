//! Shared helpers for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use lupus_core::clock::Clock;
use lupus_core::event::DomainEvent;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::rng::DeterministicRng;
use lupus_game::application::config::GameConfig;
use lupus_game::application::engine::{GameEngine, GameReport};
use lupus_game::domain::commands::StartGame;
use lupus_game::domain::distribution::RoleDistribution;
use lupus_game::domain::events::{Casualty, GameEventKind};
use lupus_test_support::{FixedClock, ScriptedMessenger};
use uuid::Uuid;

/// Venue used by every scenario.
pub const VENUE: VenueId = VenueId(77);

pub fn p(n: u64) -> ParticipantId {
    ParticipantId(n)
}

/// Roster `1..=n`.
pub fn roster(n: u64) -> Vec<ParticipantId> {
    (1..=n).map(p).collect()
}

pub fn start_game(players: u64, distribution: RoleDistribution) -> StartGame {
    StartGame {
        correlation_id: Uuid::new_v4(),
        venue: VENUE,
        roster: roster(players),
        distribution,
    }
}

/// Engine over a scripted messenger with default deadlines.
pub fn engine(
    messenger: &Arc<ScriptedMessenger>,
    rng: impl DeterministicRng + 'static,
) -> GameEngine {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    GameEngine::new(
        Arc::clone(messenger) as _,
        clock,
        Box::new(rng),
        GameConfig::default(),
    )
}

/// Event type names of the report history, in order.
pub fn event_types(report: &GameReport) -> Vec<&'static str> {
    report.history.iter().map(DomainEvent::event_type).collect()
}

/// Every casualty step recorded in the report, in order.
pub fn casualty_steps(report: &GameReport) -> Vec<Vec<Casualty>> {
    report
        .history
        .iter()
        .filter_map(|event| match &event.kind {
            GameEventKind::CasualtiesApplied(step) => Some(step.casualties.clone()),
            _ => None,
        })
        .collect()
}
