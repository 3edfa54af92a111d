//! Engine configuration.

use std::time::Duration;

use crate::domain::distribution::MIN_PLAYERS;

/// Deadline of every bounded wait in a game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// Cupid's binding, first night only.
    pub bond: Duration,
    /// The pack elimination vote.
    pub pack_vote: Duration,
    /// The seer's reveal.
    pub reveal: Duration,
    /// The witch's potion choice.
    pub potions: Duration,
    /// The one-off captain election.
    pub captain_election: Duration,
    /// Free discussion before the village vote.
    pub discussion: Duration,
    /// The village vote.
    pub village_vote: Duration,
    /// The captain's choice within a tie.
    pub tie_break: Duration,
    /// A posthumous strike.
    pub posthumous_strike: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            bond: Duration::from_secs(30),
            pack_vote: Duration::from_secs(45),
            reveal: Duration::from_secs(30),
            potions: Duration::from_secs(30),
            captain_election: Duration::from_secs(60),
            discussion: Duration::from_secs(60),
            village_vote: Duration::from_secs(120),
            tie_break: Duration::from_secs(30),
            posthumous_strike: Duration::from_secs(30),
        }
    }
}

impl Timings {
    /// Multiplies every deadline by `factor`. Non-positive or non-finite
    /// factors leave the timings unchanged; deadlines too long for a
    /// `Duration` saturate at `Duration::MAX`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return self;
        }
        let scale = |d: Duration| {
            Duration::try_from_secs_f64(d.as_secs_f64() * factor).unwrap_or(Duration::MAX)
        };
        Self {
            bond: scale(self.bond),
            pack_vote: scale(self.pack_vote),
            reveal: scale(self.reveal),
            potions: scale(self.potions),
            captain_election: scale(self.captain_election),
            discussion: scale(self.discussion),
            village_vote: scale(self.village_vote),
            tie_break: scale(self.tie_break),
            posthumous_strike: scale(self.posthumous_strike),
        }
    }
}

/// Everything tunable about a game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Deadlines.
    pub timings: Timings,
    /// Smallest accepted roster.
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            min_players: MIN_PLAYERS,
        }
    }
}
