//! Lupus Core: shared domain abstractions.
//!
//! This crate defines the identifiers, the static role catalog, the
//! collaborator port and the error types that the game engine depends on.
//! It contains no game flow and no infrastructure code.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod messaging;
pub mod rng;
