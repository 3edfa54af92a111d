//! Async orchestration of a game: collecting decisions, sequencing phases
//! and tracking live sessions per venue.

pub mod collector;
pub mod command_handlers;
pub mod config;
pub mod engine;
pub mod query_handlers;
pub mod store;

mod cascade;
mod day;
mod night;
