//! Lupus: social-deduction game engine.
//!
//! Responsible for one in-memory game per venue: hidden role assignment,
//! time-boxed night and day decisions, casualty cascades and victory
//! evaluation. Transport, rendering and persistence belong to the
//! collaborator behind [`lupus_core::messaging::Messenger`].

pub mod application;
pub mod domain;
