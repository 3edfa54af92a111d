//! Lupus simulator entry point: one game, bots in every seat.

use std::error::Error;
use std::sync::Arc;

use lupus_core::clock::SystemClock;
use lupus_core::event::DomainEvent;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::rng::{DeterministicRng, StdRngSource};
use lupus_game::application::command_handlers::{handle_cancel_game, handle_start_game};
use lupus_game::application::config::{GameConfig, Timings};
use lupus_game::application::engine::GameEngine;
use lupus_game::application::store::SessionStore;
use lupus_game::domain::commands::{CancelGame, StartGame};
use lupus_sim::bots::BotMessenger;
use lupus_sim::settings::SimSettings;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const VENUE: VenueId = VenueId(1);

fn rng(seed: Option<u64>, stream: u64) -> Box<dyn DeterministicRng> {
    match seed {
        Some(seed) => Box::new(StdRngSource::seeded(seed.wrapping_add(stream))),
        None => Box::new(StdRngSource::from_os()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let settings = SimSettings::from_env()?;
    tracing::info!(
        players = settings.players,
        seed = ?settings.seed,
        time_scale = settings.time_scale,
        "Starting Lupus simulation"
    );

    let config = GameConfig {
        timings: Timings::default().scaled(settings.time_scale),
        ..GameConfig::default()
    };
    let mut engine = GameEngine::new(
        Arc::new(BotMessenger::new(rng(settings.seed, 1))),
        Arc::new(SystemClock),
        rng(settings.seed, 0),
        config,
    );
    let store = SessionStore::new();

    let canceller = store.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let command = CancelGame {
                correlation_id: Uuid::new_v4(),
                venue: VENUE,
            };
            if let Err(error) = handle_cancel_game(&command, &canceller) {
                tracing::warn!(%error, "cancel failed");
            }
        }
    });

    let command = StartGame {
        correlation_id: Uuid::new_v4(),
        venue: VENUE,
        roster: (1..=settings.players).map(ParticipantId).collect(),
        distribution: settings.roles,
    };
    let report = handle_start_game(&command, &mut engine, &store).await?;

    for event in &report.history {
        tracing::debug!(
            sequence = event.metadata().sequence_number,
            event_type = event.event_type(),
            payload = %event.to_payload(),
            "event"
        );
    }
    tracing::info!(
        session_id = %report.session_id,
        outcome = ?report.outcome,
        rounds = report.rounds,
        winners = ?report.winners,
        survivors = ?report.survivors,
        "Simulation finished"
    );

    Ok(())
}
