//! Lupus simulator error types.

use thiserror::Error;

/// Startup errors for the simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// A `LUPUS_*` environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}
