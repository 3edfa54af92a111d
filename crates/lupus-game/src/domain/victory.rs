//! Victory evaluation, run after every casualty step.

use lupus_core::catalog::{Faction, Victory};
use lupus_core::id::ParticipantId;

use super::session::Session;

/// Checks faction counts against the living roster.
///
/// Order matters: no wolves left is a village win even when the last two
/// standing are the bonded pair, and a bonded pair of one wolf and one
/// villager wins together before wolf parity is considered.
#[must_use]
pub fn evaluate_victory(session: &Session) -> Option<Victory> {
    let wolves = session.living_in_faction(Faction::Wolves);
    if wolves == 0 {
        return Some(Victory::Village);
    }

    if let Some((a, b)) = session.bonded_pair() {
        let alive = session.alive();
        if alive.len() == 2 && alive.contains(&a) && alive.contains(&b) {
            return Some(Victory::BondedPair);
        }
    }

    let others = session.alive().len() - wolves;
    if wolves >= others {
        return Some(Victory::Wolves);
    }
    None
}

/// Everyone credited with `victory`, dead or alive.
#[must_use]
pub fn winners(session: &Session, victory: Victory) -> Vec<ParticipantId> {
    let in_faction = |faction: Faction| {
        session
            .roster()
            .iter()
            .copied()
            .filter(|p| session.role_of(*p).map(|r| r.faction()) == Some(faction))
            .collect()
    };
    match victory {
        Victory::Village => in_faction(Faction::Village),
        Victory::Wolves => in_faction(Faction::Wolves),
        Victory::BondedPair => session
            .bonded_pair()
            .map(|(a, b)| vec![a, b])
            .unwrap_or_default(),
        Victory::Solo(winner) => vec![winner],
    }
}
