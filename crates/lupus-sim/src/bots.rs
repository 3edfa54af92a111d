//! Bot participants answering every prompt at random.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::messaging::{
    Announcement, Choice, Messenger, MessengerError, Notice, Prompt,
};
use lupus_core::rng::{DeterministicRng, pick_index};
use tracing::{debug, info};

/// Chance that a bot lets a prompt expire instead of answering.
const SILENCE: f64 = 0.1;

/// A `Messenger` whose participants are bots.
///
/// Every bot is reachable. An answer is drawn uniformly from the choices
/// open to the bot and arrives after a random share of the deadline; about
/// one prompt in ten is left unanswered. Announcements go to the log.
pub struct BotMessenger {
    rng: Mutex<Box<dyn DeterministicRng>>,
}

impl std::fmt::Debug for BotMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotMessenger").finish_non_exhaustive()
    }
}

impl BotMessenger {
    /// Creates bots driven by `rng`.
    #[must_use]
    pub fn new(rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Decides how a bot answers: the choice (if any) and when it arrives.
    fn decide(&self, choices: &[Choice], deadline: Duration) -> (Option<Choice>, Duration) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.next_f64() >= 1.0 - SILENCE {
            return (None, deadline);
        }
        let choice = pick_index(rng.as_mut(), choices.len()).map(|i| choices[i]);
        let delay = deadline.mul_f64(rng.next_f64() * 0.5);
        (choice, delay)
    }
}

#[async_trait]
impl Messenger for BotMessenger {
    async fn check_reachable(&self, _participant: ParticipantId) -> Result<(), MessengerError> {
        Ok(())
    }

    async fn prompt_privately(
        &self,
        participant: ParticipantId,
        prompt: Prompt,
        deadline: Duration,
    ) -> Result<Option<Choice>, MessengerError> {
        let (choice, delay) = self.decide(&prompt.choices_for(participant), deadline);
        tokio::time::sleep(delay).await;
        debug!(%participant, kind = ?prompt.kind, ?choice, "bot answered");
        Ok(choice)
    }

    async fn notify_privately(
        &self,
        participant: ParticipantId,
        notice: Notice,
    ) -> Result<(), MessengerError> {
        debug!(%participant, ?notice, "private notice");
        Ok(())
    }

    async fn broadcast(
        &self,
        venue: VenueId,
        announcement: Announcement,
    ) -> Result<(), MessengerError> {
        let payload = serde_json::to_string(&announcement)
            .map_err(|e| MessengerError::Delivery(e.to_string()))?;
        info!(%venue, announcement = %payload, "announcement");
        Ok(())
    }

    async fn resolve_identity(&self, participant: ParticipantId) -> String {
        format!("bot-{participant}")
    }
}
