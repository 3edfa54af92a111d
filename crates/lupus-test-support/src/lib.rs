//! Shared test doubles and utilities for the Lupus game engine.

mod clock;
mod messenger;
mod rng;

pub use clock::FixedClock;
pub use messenger::{Delivery, ScriptedMessenger};
pub use rng::{MockRng, SequenceRng};
