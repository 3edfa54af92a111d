//! Wall-clock source for event timestamps.
//!
//! Only event metadata reads this clock. Deadlines and the discussion pause
//! run on the tokio timer so paused-time tests stay deterministic.

use chrono::{DateTime, Utc};

/// Source of `occurred_at` stamps.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
