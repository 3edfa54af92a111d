//! Static role catalog shared by every session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Group of roles sharing a win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Wins once no wolf is left alive.
    Village,
    /// Wins once wolves are at least as many as everybody else.
    Wolves,
    /// Plays for a personal win condition.
    Solo,
}

/// Kind of night action a role performs. Each kind has exactly one resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NightAbility {
    /// Binds two participants into the bonded pair (first night only).
    Bond,
    /// Takes part in the pack elimination vote.
    PackVote,
    /// Learns the role of one living participant.
    Reveal,
    /// May cancel the pack's victim or eliminate someone, each once per game.
    Potions,
}

impl NightAbility {
    /// Resolution order within a night.
    pub const ORDER: [Self; 4] = [Self::Bond, Self::PackVote, Self::Reveal, Self::Potions];
}

/// A role identifier. Roles are immutable and shared across sessions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Role {
    /// Member of the pack.
    Werewolf,
    /// Plain villager.
    Villager,
    /// Sees one role per night.
    Seer,
    /// Holds a healing and a poison potion.
    Witch,
    /// Takes someone down when eliminated.
    Hunter,
    /// Forms the bonded pair.
    Cupid,
    /// Wins alone if voted out first.
    Angel,
}

impl Role {
    /// Every role in the catalog.
    pub const ALL: [Self; 7] = [
        Self::Werewolf,
        Self::Villager,
        Self::Seer,
        Self::Witch,
        Self::Hunter,
        Self::Cupid,
        Self::Angel,
    ];

    /// The faction this role plays for.
    #[must_use]
    pub fn faction(self) -> Faction {
        match self {
            Self::Werewolf => Faction::Wolves,
            Self::Angel => Faction::Solo,
            Self::Villager | Self::Seer | Self::Witch | Self::Hunter | Self::Cupid => {
                Faction::Village
            }
        }
    }

    /// Night action of this role, if any.
    #[must_use]
    pub fn night_ability(self) -> Option<NightAbility> {
        match self {
            Self::Werewolf => Some(NightAbility::PackVote),
            Self::Seer => Some(NightAbility::Reveal),
            Self::Witch => Some(NightAbility::Potions),
            Self::Cupid => Some(NightAbility::Bond),
            Self::Villager | Self::Hunter | Self::Angel => None,
        }
    }

    /// Whether this role gets a posthumous strike when eliminated.
    #[must_use]
    pub fn has_posthumous_strike(self) -> bool {
        matches!(self, Self::Hunter)
    }

    /// Whether a distribution may hold more than one of this role.
    #[must_use]
    pub fn is_stackable(self) -> bool {
        matches!(self, Self::Werewolf | Self::Villager)
    }

    /// Stable lowercase identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Werewolf => "werewolf",
            Self::Villager => "villager",
            Self::Seer => "seer",
            Self::Witch => "witch",
            Self::Hunter => "hunter",
            Self::Cupid => "cupid",
            Self::Angel => "angel",
        }
    }

    /// Parses a lowercase identifier produced by [`Role::as_str`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victory {
    /// Every wolf is dead.
    Village,
    /// Wolves reached parity with the rest.
    Wolves,
    /// Only the bonded pair is left standing.
    BondedPair,
    /// The solo participant was eliminated by the first village vote.
    Solo(crate::id::ParticipantId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_werewolf_belongs_to_wolves() {
        let wolves: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| r.faction() == Faction::Wolves)
            .collect();
        assert_eq!(wolves, vec![Role::Werewolf]);
    }

    #[test]
    fn test_angel_is_solo_and_sleeps() {
        assert_eq!(Role::Angel.faction(), Faction::Solo);
        assert_eq!(Role::Angel.night_ability(), None);
    }

    #[test]
    fn test_night_roles_map_to_abilities() {
        assert_eq!(Role::Werewolf.night_ability(), Some(NightAbility::PackVote));
        assert_eq!(Role::Seer.night_ability(), Some(NightAbility::Reveal));
        assert_eq!(Role::Witch.night_ability(), Some(NightAbility::Potions));
        assert_eq!(Role::Cupid.night_ability(), Some(NightAbility::Bond));
        assert_eq!(Role::Hunter.night_ability(), None);
        assert!(Role::Hunter.has_posthumous_strike());
    }

    #[test]
    fn test_parse_round_trips_every_identifier() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("dragon"), None);
    }
}
