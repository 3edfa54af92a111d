//! Simulator settings read from `LUPUS_*` environment variables.

use lupus_core::catalog::Role;
use lupus_game::domain::distribution::RoleDistribution;

use crate::error::SimError;

/// Players seated when `LUPUS_PLAYERS` is unset.
pub const DEFAULT_PLAYERS: u64 = 8;

/// Largest accepted `LUPUS_TIME_SCALE`.
pub const MAX_TIME_SCALE: f64 = 100.0;

/// Deadline factor when `LUPUS_TIME_SCALE` is unset; a full game takes a few
/// seconds.
pub const DEFAULT_TIME_SCALE: f64 = 0.01;

/// What the simulator plays.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    /// Seats, numbered from 1.
    pub players: u64,
    /// Roles to deal.
    pub roles: RoleDistribution,
    /// Seed for dealing, draws and bot behaviour. Random when `None`.
    pub seed: Option<u64>,
    /// Factor applied to every deadline.
    pub time_scale: f64,
}

impl SimSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` when a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SimError> {
        let players: u64 = match lookup("LUPUS_PLAYERS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| SimError::Config(format!("LUPUS_PLAYERS must be a number: {e}")))?,
            None => DEFAULT_PLAYERS,
        };

        let roles = match lookup("LUPUS_ROLES") {
            Some(raw) => RoleDistribution::parse(&raw)
                .map_err(|e| SimError::Config(format!("LUPUS_ROLES: {e}")))?,
            None => default_roles(players),
        };

        let seed = lookup("LUPUS_SEED")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| SimError::Config(format!("LUPUS_SEED must be a u64: {e}")))
            })
            .transpose()?;

        let time_scale = match lookup("LUPUS_TIME_SCALE") {
            Some(raw) => {
                let scale: f64 = raw.trim().parse().map_err(|e| {
                    SimError::Config(format!("LUPUS_TIME_SCALE must be a number: {e}"))
                })?;
                if !(scale.is_finite() && scale > 0.0 && scale <= MAX_TIME_SCALE) {
                    return Err(SimError::Config(format!(
                        "LUPUS_TIME_SCALE must be in (0, {MAX_TIME_SCALE}], got {scale}"
                    )));
                }
                scale
            }
            None => DEFAULT_TIME_SCALE,
        };

        Ok(Self {
            players,
            roles,
            seed,
            time_scale,
        })
    }
}

/// A balanced table for `players` seats: one werewolf per four players,
/// the special roles as the table grows, villagers for the rest.
#[must_use]
pub fn default_roles(players: u64) -> RoleDistribution {
    let players = usize::try_from(players).unwrap_or(usize::MAX);
    let wolves = (players / 4).max(1);
    let specials: Vec<Role> = [
        (4, Role::Seer),
        (6, Role::Witch),
        (7, Role::Hunter),
        (8, Role::Cupid),
        (10, Role::Angel),
    ]
    .into_iter()
    .filter(|(from, _)| players >= *from)
    .map(|(_, role)| role)
    .collect();

    let villagers = players.saturating_sub(wolves + specials.len());
    specials
        .into_iter()
        .fold(RoleDistribution::new().with(Role::Werewolf, wolves), |acc, role| {
            acc.with(role, 1)
        })
        .with(Role::Villager, villagers)
}
