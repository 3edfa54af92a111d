//! In-process play-testing for the Lupus engine: bot participants and the
//! environment settings of the `lupus-sim` binary.

pub mod bots;
pub mod error;
pub mod settings;
