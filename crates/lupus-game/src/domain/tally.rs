//! Vote counting shared by the pack vote, the captain election and the
//! village vote.

use lupus_core::id::ParticipantId;

/// Counts per target, ordered by when each target received its first ballot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: Vec<(ParticipantId, usize)>,
}

impl Tally {
    /// Counts `(voter, target)` ballots given in arrival order.
    #[must_use]
    pub fn from_ballots(ballots: &[(ParticipantId, ParticipantId)]) -> Self {
        let mut counts: Vec<(ParticipantId, usize)> = Vec::new();
        for (_, target) in ballots {
            match counts.iter_mut().find(|(t, _)| t == target) {
                Some((_, count)) => *count += 1,
                None => counts.push((*target, 1)),
            }
        }
        Self { counts }
    }

    /// Ballots received by `target`.
    #[must_use]
    pub fn count(&self, target: ParticipantId) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == target)
            .map_or(0, |(_, count)| *count)
    }

    /// Every target sharing the highest count, in first-ballot order.
    #[must_use]
    pub fn leaders(&self) -> Vec<ParticipantId> {
        let Some(top) = self.counts.iter().map(|(_, count)| *count).max() else {
            return Vec::new();
        };
        self.counts
            .iter()
            .filter(|(_, count)| *count == top)
            .map(|(target, _)| *target)
            .collect()
    }

    /// Plurality winner, ties going to the target whose first ballot came first.
    #[must_use]
    pub fn first_submitted_leader(&self) -> Option<ParticipantId> {
        self.leaders().first().copied()
    }
}
