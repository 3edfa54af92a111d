//! Pure game state. Nothing in here awaits or talks to participants.

pub mod commands;
pub mod distribution;
pub mod events;
pub mod session;
pub mod tally;
pub mod victory;
