//! Action Collector: prompts several participants at once and gathers what
//! comes back before a shared deadline.

use std::sync::Arc;
use std::time::Duration;

use lupus_core::id::ParticipantId;
use lupus_core::messaging::{Choice, Messenger, Prompt};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Answers gathered by one collection, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    responses: Vec<(ParticipantId, Choice)>,
}

impl Collected {
    /// `(requester, choice)` pairs in arrival order.
    #[must_use]
    pub fn responses(&self) -> &[(ParticipantId, Choice)] {
        &self.responses
    }

    /// Whether nobody answered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The answer given by `requester`, if any.
    #[must_use]
    pub fn response_of(&self, requester: ParticipantId) -> Option<Choice> {
        self.responses
            .iter()
            .find(|(p, _)| *p == requester)
            .map(|(_, choice)| *choice)
    }

    /// Single-target answers as `(requester, target)` ballots.
    #[must_use]
    pub fn ballots(&self) -> Vec<(ParticipantId, ParticipantId)> {
        self.responses
            .iter()
            .filter_map(|(voter, choice)| match choice {
                Choice::Target(target) => Some((*voter, *target)),
                _ => None,
            })
            .collect()
    }
}

/// Fans a prompt out to many participants and joins on "all answered or
/// deadline elapsed", whichever comes first.
#[derive(Clone)]
pub struct ActionCollector {
    messenger: Arc<dyn Messenger>,
}

impl std::fmt::Debug for ActionCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCollector").finish_non_exhaustive()
    }
}

impl ActionCollector {
    /// Creates a collector delivering prompts through `messenger`.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Prompts every requester and returns whatever arrived in time.
    ///
    /// Answers outside the prompt's choices, second answers and answers
    /// arriving after the deadline are discarded. Delivery failures count as
    /// no answer. Outstanding prompts are aborted on return, and also when
    /// the returned future is dropped.
    pub async fn collect(
        &self,
        requesters: &[ParticipantId],
        prompt: &Prompt,
        deadline: Duration,
    ) -> Collected {
        let mut collected = Collected::default();
        if requesters.is_empty() {
            return collected;
        }

        let mut pending = JoinSet::new();
        for &requester in requesters {
            let messenger = Arc::clone(&self.messenger);
            let prompt = prompt.clone();
            pending.spawn(async move {
                let answer = messenger.prompt_privately(requester, prompt, deadline).await;
                (requester, answer)
            });
        }

        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;
                () = &mut timer => {
                    debug!(kind = ?prompt.kind, outstanding = pending.len(), "deadline elapsed");
                    break;
                }
                joined = pending.join_next() => {
                    let Some(joined) = joined else { break };
                    match joined {
                        Ok((requester, Ok(Some(choice)))) => {
                            if collected.response_of(requester).is_some() {
                                debug!(%requester, "duplicate answer ignored");
                            } else if prompt.accepts(requester, &choice) {
                                debug!(%requester, ?choice, "answer received");
                                collected.responses.push((requester, choice));
                            } else {
                                debug!(%requester, ?choice, "answer outside choices ignored");
                            }
                        }
                        Ok((requester, Ok(None))) => {
                            debug!(%requester, "no answer");
                        }
                        Ok((requester, Err(error))) => {
                            warn!(%requester, %error, "prompt delivery failed");
                        }
                        Err(error) => {
                            warn!(%error, "prompt task failed");
                        }
                    }
                }
            }
        }

        pending.abort_all();
        collected
    }

    /// Prompts a single participant.
    pub async fn collect_one(
        &self,
        requester: ParticipantId,
        prompt: &Prompt,
        deadline: Duration,
    ) -> Option<Choice> {
        self.collect(&[requester], prompt, deadline)
            .await
            .response_of(requester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lupus_core::messaging::PromptKind;
    use lupus_test_support::ScriptedMessenger;
    use tokio::time::Instant;

    fn p(n: u64) -> ParticipantId {
        ParticipantId(n)
    }

    fn vote_prompt() -> Prompt {
        Prompt::new(
            PromptKind::VillageVote,
            vec![Choice::Target(p(1)), Choice::Target(p(2)), Choice::Target(p(3))],
        )
        .excluding_self()
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_early_when_everyone_answered() {
        // Arrange
        let messenger = ScriptedMessenger::new()
            .reply_after(
                p(1),
                PromptKind::VillageVote,
                Duration::from_secs(2),
                Choice::Target(p(2)),
            )
            .reply_after(
                p(2),
                PromptKind::VillageVote,
                Duration::from_secs(1),
                Choice::Target(p(3)),
            );
        let collector = ActionCollector::new(Arc::new(messenger));
        let started = Instant::now();

        // Act
        let collected = collector
            .collect(&[p(1), p(2)], &vote_prompt(), Duration::from_secs(120))
            .await;

        // Assert
        assert_eq!(
            collected.responses(),
            &[(p(2), Choice::Target(p(3))), (p(1), Choice::Target(p(2)))]
        );
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_discards_late_answers() {
        // Arrange
        let messenger = ScriptedMessenger::new()
            .reply_after(
                p(1),
                PromptKind::VillageVote,
                Duration::from_secs(5),
                Choice::Target(p(2)),
            )
            .reply_after(
                p(2),
                PromptKind::VillageVote,
                Duration::from_secs(50),
                Choice::Target(p(1)),
            );
        let collector = ActionCollector::new(Arc::new(messenger));
        let started = Instant::now();

        // Act
        let collected = collector
            .collect(&[p(1), p(2), p(3)], &vote_prompt(), Duration::from_secs(30))
            .await;

        // Assert
        assert_eq!(collected.responses(), &[(p(1), Choice::Target(p(2)))]);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_and_self_answers_are_ignored() {
        let messenger = ScriptedMessenger::new()
            .reply(p(1), PromptKind::VillageVote, Choice::Target(p(1)))
            .reply(p(2), PromptKind::VillageVote, Choice::Target(p(9)))
            .reply(p(3), PromptKind::VillageVote, Choice::Target(p(1)));
        let collector = ActionCollector::new(Arc::new(messenger));

        let collected = collector
            .collect(&[p(1), p(2), p(3)], &vote_prompt(), Duration::from_secs(10))
            .await;

        assert_eq!(collected.ballots(), vec![(p(3), p(1))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_failure_counts_as_no_answer() {
        let messenger = ScriptedMessenger::new()
            .failing_prompts(p(1))
            .reply(p(2), PromptKind::VillageVote, Choice::Target(p(3)));
        let collector = ActionCollector::new(Arc::new(messenger));

        let collected = collector
            .collect(&[p(1), p(2)], &vote_prompt(), Duration::from_secs(10))
            .await;

        assert_eq!(collected.response_of(p(1)), None);
        assert_eq!(collected.response_of(p(2)), Some(Choice::Target(p(3))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_requesters_returns_immediately() {
        let collector = ActionCollector::new(Arc::new(ScriptedMessenger::new()));
        let collected = collector.collect(&[], &vote_prompt(), Duration::from_secs(10)).await;
        assert!(collected.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_one_times_out_to_none() {
        let collector = ActionCollector::new(Arc::new(ScriptedMessenger::new()));
        let answer = collector
            .collect_one(p(1), &vote_prompt(), Duration::from_secs(30))
            .await;
        assert_eq!(answer, None);
    }
}
