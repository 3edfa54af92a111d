//! Test messenger: a scripted, recording `Messenger` implementation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lupus_core::id::{ParticipantId, VenueId};
use lupus_core::messaging::{
    Announcement, Choice, Messenger, MessengerError, Notice, Prompt, PromptKind,
};

/// Everything the messenger was asked to deliver, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A private prompt.
    Prompt {
        /// Who was prompted.
        participant: ParticipantId,
        /// The prompt as delivered.
        prompt: Prompt,
    },
    /// A private notice.
    Notice {
        /// Who was notified.
        participant: ParticipantId,
        /// The notice.
        notice: Notice,
    },
    /// A public announcement.
    Broadcast {
        /// Where it was announced.
        venue: VenueId,
        /// The announcement.
        announcement: Announcement,
    },
}

#[derive(Debug, Clone, Copy)]
struct Reply {
    delay: Duration,
    choice: Option<Choice>,
}

/// A messenger whose participants answer from a per-prompt-kind script.
///
/// Unscripted prompts are never answered: the call resolves to `Ok(None)`
/// once the prompt deadline has elapsed. Pair with
/// `#[tokio::test(start_paused = true)]` so delays cost no wall time.
#[derive(Debug, Default)]
pub struct ScriptedMessenger {
    unreachable: HashSet<ParticipantId>,
    slow_checks: HashMap<ParticipantId, Duration>,
    failing_prompts: HashSet<ParticipantId>,
    failing_broadcasts: bool,
    replies: Mutex<HashMap<(ParticipantId, PromptKind), VecDeque<Reply>>>,
    log: Mutex<Vec<Delivery>>,
}

impl ScriptedMessenger {
    /// Creates a messenger where every participant is reachable and silent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `participant` unreachable for private prompts.
    #[must_use]
    pub fn unreachable(mut self, participant: ParticipantId) -> Self {
        self.unreachable.insert(participant);
        self
    }

    /// Delays the reachability check of `participant` by `delay`.
    #[must_use]
    pub fn slow_reachability(mut self, participant: ParticipantId, delay: Duration) -> Self {
        self.slow_checks.insert(participant, delay);
        self
    }

    /// Makes every prompt to `participant` fail with a delivery error.
    #[must_use]
    pub fn failing_prompts(mut self, participant: ParticipantId) -> Self {
        self.failing_prompts.insert(participant);
        self
    }

    /// Makes every broadcast fail with a delivery error.
    #[must_use]
    pub fn failing_broadcasts(mut self) -> Self {
        self.failing_broadcasts = true;
        self
    }

    /// Queues an immediate answer from `participant` to the next prompt of `kind`.
    #[must_use]
    pub fn reply(self, participant: ParticipantId, kind: PromptKind, choice: Choice) -> Self {
        self.reply_after(participant, kind, Duration::ZERO, choice)
    }

    /// Queues an answer that arrives `delay` after the prompt was delivered.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn reply_after(
        mut self,
        participant: ParticipantId,
        kind: PromptKind,
        delay: Duration,
        choice: Choice,
    ) -> Self {
        self.replies
            .get_mut()
            .unwrap()
            .entry((participant, kind))
            .or_default()
            .push_back(Reply {
                delay,
                choice: Some(choice),
            });
        self
    }

    /// Returns a snapshot of all deliveries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().unwrap().clone()
    }

    /// Notices delivered to `participant`.
    pub fn notices_to(&self, participant: ParticipantId) -> Vec<Notice> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Notice {
                    participant: p,
                    notice,
                } if p == participant => Some(notice),
                _ => None,
            })
            .collect()
    }

    /// Prompts delivered to `participant`.
    pub fn prompts_to(&self, participant: ParticipantId) -> Vec<Prompt> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Prompt {
                    participant: p,
                    prompt,
                } if p == participant => Some(prompt),
                _ => None,
            })
            .collect()
    }

    /// All public announcements.
    pub fn announcements(&self) -> Vec<Announcement> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Broadcast { announcement, .. } => Some(announcement),
                _ => None,
            })
            .collect()
    }

    fn record(&self, delivery: Delivery) {
        self.log.lock().unwrap().push(delivery);
    }

    fn next_reply(&self, participant: ParticipantId, kind: PromptKind) -> Option<Reply> {
        self.replies
            .lock()
            .unwrap()
            .get_mut(&(participant, kind))
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn check_reachable(&self, participant: ParticipantId) -> Result<(), MessengerError> {
        if let Some(delay) = self.slow_checks.get(&participant) {
            tokio::time::sleep(*delay).await;
        }
        if self.unreachable.contains(&participant) {
            return Err(MessengerError::Unreachable(participant));
        }
        Ok(())
    }

    async fn prompt_privately(
        &self,
        participant: ParticipantId,
        prompt: Prompt,
        deadline: Duration,
    ) -> Result<Option<Choice>, MessengerError> {
        let kind = prompt.kind;
        self.record(Delivery::Prompt {
            participant,
            prompt,
        });
        if self.unreachable.contains(&participant) {
            return Err(MessengerError::Unreachable(participant));
        }
        if self.failing_prompts.contains(&participant) {
            return Err(MessengerError::Delivery("direct messages closed".into()));
        }

        match self.next_reply(participant, kind) {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                Ok(reply.choice)
            }
            None => {
                tokio::time::sleep(deadline).await;
                Ok(None)
            }
        }
    }

    async fn notify_privately(
        &self,
        participant: ParticipantId,
        notice: Notice,
    ) -> Result<(), MessengerError> {
        self.record(Delivery::Notice {
            participant,
            notice,
        });
        Ok(())
    }

    async fn broadcast(
        &self,
        venue: VenueId,
        announcement: Announcement,
    ) -> Result<(), MessengerError> {
        self.record(Delivery::Broadcast {
            venue,
            announcement,
        });
        if self.failing_broadcasts {
            return Err(MessengerError::Delivery("channel unavailable".into()));
        }
        Ok(())
    }

    async fn resolve_identity(&self, participant: ParticipantId) -> String {
        format!("player-{participant}")
    }
}
