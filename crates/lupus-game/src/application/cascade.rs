//! Casualty steps: batch application, bonded-pair cascade and the
//! posthumous strike.

use lupus_core::id::ParticipantId;
use lupus_core::messaging::{Choice, DeathCause, Prompt, PromptKind};
use tracing::{debug, info};

use super::engine::GameEngine;
use crate::domain::events::{CasualtiesApplied, Casualty, GameEventKind};
use crate::domain::session::Session;

impl GameEngine {
    /// Applies one casualty step and returns everyone it removed.
    ///
    /// Only members of the primary batch may strike back; the strike's target
    /// drags their bonded partner along but never strikes in turn.
    pub(crate) async fn apply_step(
        &mut self,
        session: &mut Session,
        batch: &[(ParticipantId, DeathCause)],
    ) -> Vec<Casualty> {
        let mut casualties = session.apply_batch(batch);

        let strikers: Vec<ParticipantId> = casualties
            .iter()
            .filter(|c| c.cause != DeathCause::Heartbreak && c.role.has_posthumous_strike())
            .map(|c| c.participant)
            .collect();
        for striker in strikers {
            if let Some(target) = self.posthumous_strike(session, striker).await {
                info!(%striker, %target, "posthumous strike");
                casualties.extend(session.apply_batch(&[(target, DeathCause::Strike)]));
            }
        }

        if !casualties.is_empty() {
            session.record(
                GameEventKind::CasualtiesApplied(CasualtiesApplied {
                    round: session.round(),
                    casualties: casualties.clone(),
                }),
                self.clock.as_ref(),
            );
        }
        casualties
    }

    async fn posthumous_strike(
        &self,
        session: &Session,
        striker: ParticipantId,
    ) -> Option<ParticipantId> {
        let choices: Vec<Choice> = session.alive().iter().copied().map(Choice::Target).collect();
        if choices.is_empty() {
            return None;
        }
        let prompt = Prompt::new(PromptKind::PosthumousStrike, choices);
        match self
            .collector
            .collect_one(striker, &prompt, self.config.timings.posthumous_strike)
            .await
        {
            Some(Choice::Target(target)) => Some(target),
            _ => {
                debug!(%striker, "strike withheld");
                None
            }
        }
    }
}
