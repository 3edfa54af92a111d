//! Role distributions and the setup preconditions they must satisfy.

use std::collections::{BTreeMap, BTreeSet};

use lupus_core::catalog::{Faction, Role};
use lupus_core::error::DomainError;
use lupus_core::id::ParticipantId;
use lupus_core::rng::{DeterministicRng, shuffle};

/// Smallest roster a game can be played with.
pub const MIN_PLAYERS: usize = 4;

/// How many of each role to deal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDistribution(BTreeMap<Role, usize>);

impl RoleDistribution {
    /// Creates an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` copies of `role`.
    #[must_use]
    pub fn with(mut self, role: Role, count: usize) -> Self {
        if count > 0 {
            *self.0.entry(role).or_default() += count;
        }
        self
    }

    /// Parses `werewolf:2,seer:1,villager:3`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on unknown roles or malformed counts.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(Self::new(), |acc, entry| {
                let (name, count) = entry.split_once(':').ok_or_else(|| {
                    DomainError::Validation(format!("expected role:count, got {entry:?}"))
                })?;
                let role = Role::parse(name.trim()).ok_or_else(|| {
                    DomainError::Validation(format!("unknown role {:?}", name.trim()))
                })?;
                let count: usize = count.trim().parse().map_err(|e| {
                    DomainError::Validation(format!("invalid count for {role}: {e}"))
                })?;
                Ok(acc.with(role, count))
            })
    }

    /// Total number of roles.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Copies of `role` in the distribution.
    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.0.get(&role).copied().unwrap_or(0)
    }

    /// Iterates over `(role, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        self.0.iter().map(|(role, count)| (*role, *count))
    }

    /// Checks the distribution against a roster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the roster is too small or holds
    /// duplicates, if counts do not sum to the roster size, if either side of
    /// the game is empty, or if a special role appears more than once.
    pub fn validate(
        &self,
        roster: &[ParticipantId],
        min_players: usize,
    ) -> Result<(), DomainError> {
        if roster.len() < min_players {
            return Err(DomainError::Validation(format!(
                "at least {min_players} players are needed, got {}",
                roster.len()
            )));
        }
        let unique: BTreeSet<_> = roster.iter().collect();
        if unique.len() != roster.len() {
            return Err(DomainError::Validation(
                "roster contains duplicate participants".to_owned(),
            ));
        }
        if self.total() != roster.len() {
            return Err(DomainError::Validation(format!(
                "distribution deals {} roles for {} players",
                self.total(),
                roster.len()
            )));
        }

        let wolves: usize = self
            .iter()
            .filter(|(role, _)| role.faction() == Faction::Wolves)
            .map(|(_, count)| count)
            .sum();
        if wolves == 0 {
            return Err(DomainError::Validation(
                "distribution needs at least one werewolf".to_owned(),
            ));
        }
        if wolves == self.total() {
            return Err(DomainError::Validation(
                "distribution needs at least one non-wolf".to_owned(),
            ));
        }
        if let Some((role, _)) = self
            .iter()
            .find(|(role, count)| !role.is_stackable() && *count > 1)
        {
            return Err(DomainError::Validation(format!(
                "role {role} can only be dealt once"
            )));
        }
        Ok(())
    }

    /// Deals the distribution over `roster` uniformly at random.
    ///
    /// The caller validates first; the result is a bijection roster → role
    /// whose counts match the distribution exactly.
    #[must_use]
    pub fn deal(
        &self,
        roster: &[ParticipantId],
        rng: &mut dyn DeterministicRng,
    ) -> BTreeMap<ParticipantId, Role> {
        let mut deck: Vec<Role> = self
            .iter()
            .flat_map(|(role, count)| std::iter::repeat_n(role, count))
            .collect();
        shuffle(rng, &mut deck);
        roster.iter().copied().zip(deck).collect()
    }
}
