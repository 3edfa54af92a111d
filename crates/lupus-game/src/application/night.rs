//! Night Resolver.

use lupus_core::catalog::NightAbility;
use lupus_core::id::ParticipantId;
use lupus_core::messaging::{Announcement, Choice, Notice, Prompt, PromptKind};
use tracing::{debug, info, instrument, warn};

use super::engine::GameEngine;
use super::store::SessionTicket;
use crate::domain::events::{
    Casualty, GameEventKind, PackTargetChosen, PairBonded, PotionUsed, SeerRevealed,
};
use crate::domain::session::{OneShot, Session};
use crate::domain::tally::Tally;

impl GameEngine {
    /// Runs every night ability in order, then applies the night's casualties.
    #[instrument(skip_all, fields(venue = %session.venue(), round = session.round()))]
    pub(crate) async fn run_night(
        &mut self,
        session: &mut Session,
        ticket: &SessionTicket,
    ) -> Vec<Casualty> {
        session.begin_night();
        ticket.publish(session);
        info!("night falls");
        self.announce(
            session.venue(),
            Announcement::NightFalls {
                round: session.round(),
            },
        )
        .await;

        for ability in NightAbility::ORDER {
            let actors = session.living_with_ability(ability);
            if actors.is_empty() {
                continue;
            }
            self.resolve_ability(session, ability, &actors).await;
        }

        let batch = session.night_batch();
        let casualties = self.apply_step(session, &batch).await;
        info!(casualties = casualties.len(), "night resolved");
        self.announce_casualties(session, &casualties).await;
        casualties
    }

    /// Dispatches `ability` to its resolver. `actors` are the living
    /// participants whose role wakes up for it, never empty.
    async fn resolve_ability(
        &mut self,
        session: &mut Session,
        ability: NightAbility,
        actors: &[ParticipantId],
    ) {
        match ability {
            NightAbility::Bond => self.resolve_bond(session, actors[0]).await,
            NightAbility::PackVote => self.resolve_pack_vote(session, actors).await,
            NightAbility::Reveal => self.resolve_reveal(session, actors[0]).await,
            NightAbility::Potions => self.resolve_potions(session, actors[0]).await,
        }
    }

    async fn resolve_bond(&mut self, session: &mut Session, cupid: ParticipantId) {
        if session.round() != 1 || session.is_consumed(OneShot::Bond) {
            return;
        }

        let living: Vec<ParticipantId> = session.alive().iter().copied().collect();
        let mut choices = Vec::new();
        for (i, first) in living.iter().enumerate() {
            for second in &living[i + 1..] {
                choices.push(Choice::Bond(*first, *second));
            }
        }
        let prompt = Prompt::new(PromptKind::Bond, choices);

        let Some(Choice::Bond(first, second)) = self
            .collector
            .collect_one(cupid, &prompt, self.config.timings.bond)
            .await
        else {
            debug!(%cupid, "no bond formed");
            return;
        };
        if let Err(error) = session.bond(first, second) {
            warn!(%error, "bond rejected");
            return;
        }

        session.record(
            GameEventKind::PairBonded(PairBonded { first, second }),
            self.clock.as_ref(),
        );
        self.notify(first, Notice::Bonded { partner: second }).await;
        self.notify(second, Notice::Bonded { partner: first }).await;
    }

    async fn resolve_pack_vote(&mut self, session: &mut Session, pack: &[ParticipantId]) {
        let choices = session
            .alive()
            .iter()
            .copied()
            .filter(|p| !pack.contains(p))
            .map(Choice::Target)
            .collect();
        let prompt = Prompt::new(PromptKind::PackVote, choices);

        let collected = self
            .collector
            .collect(pack, &prompt, self.config.timings.pack_vote)
            .await;
        let ballots = collected.ballots();
        let tally = Tally::from_ballots(&ballots);
        let target = tally.first_submitted_leader();
        let support = target.map_or(0, |t| tally.count(t));
        info!(ballots = ballots.len(), support, ?target, "pack vote closed");

        session.set_pack_target(target);
        session.record(
            GameEventKind::PackTargetChosen(PackTargetChosen { ballots, target }),
            self.clock.as_ref(),
        );
    }

    async fn resolve_reveal(&mut self, session: &mut Session, seer: ParticipantId) {
        let choices = session.alive().iter().copied().map(Choice::Target).collect();
        let prompt = Prompt::new(PromptKind::Reveal, choices).excluding_self();

        let Some(Choice::Target(target)) = self
            .collector
            .collect_one(seer, &prompt, self.config.timings.reveal)
            .await
        else {
            return;
        };
        let Some(role) = session.role_of(target) else {
            return;
        };

        self.notify(seer, Notice::Revealed { target, role }).await;
        session.record(
            GameEventKind::SeerRevealed(SeerRevealed { seer, target }),
            self.clock.as_ref(),
        );
    }

    async fn resolve_potions(&mut self, session: &mut Session, witch: ParticipantId) {
        let victim = session.night_actions().pack_target;
        let can_heal = !session.is_consumed(OneShot::HealPotion) && victim.is_some();
        let can_poison = !session.is_consumed(OneShot::PoisonPotion);
        if !can_heal && !can_poison {
            return;
        }

        let mut choices = Vec::new();
        if let (true, Some(victim)) = (can_heal, victim) {
            choices.push(Choice::Heal(victim));
        }
        if can_poison {
            choices.extend(
                session
                    .alive()
                    .iter()
                    .copied()
                    .filter(|p| *p != witch)
                    .map(Choice::Poison),
            );
        }
        choices.push(Choice::Pass);
        let prompt = Prompt::new(PromptKind::Potions, choices);

        let Some(choice) = self
            .collector
            .collect_one(witch, &prompt, self.config.timings.potions)
            .await
        else {
            return;
        };
        let applied = match choice {
            Choice::Heal(target) => session.heal(target),
            Choice::Poison(target) => session.poison(target),
            Choice::Target(_) | Choice::Bond(..) | Choice::Pass => return,
        };
        if let Err(error) = applied {
            warn!(%error, "potion rejected");
            return;
        }
        session.record(
            GameEventKind::PotionUsed(PotionUsed { witch, choice }),
            self.clock.as_ref(),
        );
    }
}
