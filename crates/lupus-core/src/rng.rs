//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests and replays,
//! a seeded or recorded implementation is injected.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production RNG backed by `rand`'s standard generator.
#[derive(Debug)]
pub struct StdRngSource(StdRng);

impl StdRngSource {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeds deterministically, for reproducible play-tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdRngSource {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.random()
    }
}

/// Picks an index in `0..len` using `rng`. Returns `None` for an empty range.
pub fn pick_index(rng: &mut dyn DeterministicRng, len: usize) -> Option<usize> {
    let last = u32::try_from(len.checked_sub(1)?).ok()?;
    let picked = rng.next_u32_range(0, last) as usize;
    Some(picked.min(len - 1))
}

/// Fisher-Yates shuffle driven by a [`DeterministicRng`].
pub fn shuffle<T>(rng: &mut dyn DeterministicRng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        if let Some(j) = pick_index(rng, i + 1) {
            items.swap(i, j);
        }
    }
}
