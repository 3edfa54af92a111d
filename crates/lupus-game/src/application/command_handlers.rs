//! Command handlers for the game engine.
//!
//! This module contains application-level command handler functions that
//! orchestrate a session: register it, set it up, play it, unregister it.

use lupus_core::command::Command;
use lupus_core::error::DomainError;
use tracing::{info, instrument};

use super::engine::{GameEngine, GameReport};
use super::store::SessionStore;
use crate::domain::commands::{CancelGame, StartGame};

/// Handles the `StartGame` command: registers the venue, runs setup and plays
/// the game to completion.
///
/// The venue is unregistered when this returns, whatever the outcome.
///
/// # Errors
///
/// Returns `DomainError::SessionAlreadyRunning` if the venue is taken,
/// `DomainError::Validation` or `DomainError::Unreachable` if setup
/// preconditions fail, and `DomainError::Cancelled` if the game is cancelled
/// before setup completes.
#[instrument(skip_all, fields(venue = %command.venue, correlation_id = %command.correlation_id))]
pub async fn handle_start_game(
    command: &StartGame,
    engine: &mut GameEngine,
    store: &SessionStore,
) -> Result<GameReport, DomainError> {
    let ticket = store.open(command.venue)?;
    info!(command = command.command_type(), "handling command");

    let session = tokio::select! {
        result = engine.setup(command) => result?,
        () = ticket.cancelled() => return Err(DomainError::Cancelled(ticket.venue())),
    };

    Ok(engine.run(session, &ticket).await)
}

/// Handles the `CancelGame` command.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no session runs in the venue.
#[instrument(skip_all, fields(venue = %command.venue, correlation_id = %command.correlation_id))]
pub fn handle_cancel_game(command: &CancelGame, store: &SessionStore) -> Result<(), DomainError> {
    info!(command = command.command_type(), "handling command");
    store.cancel(command.venue)
}
