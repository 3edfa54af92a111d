//! Day Resolver: captain election, discussion, village vote and tie-break.

use lupus_core::catalog::Victory;
use lupus_core::id::ParticipantId;
use lupus_core::messaging::{Announcement, Choice, DeathCause, Prompt, PromptKind};
use lupus_core::rng::pick_index;
use tracing::{info, instrument, warn};

use super::engine::GameEngine;
use super::store::SessionTicket;
use crate::domain::events::{CaptainElected, GameEventKind, TieBroken, VoteTallied};
use crate::domain::session::Session;
use crate::domain::tally::Tally;

impl GameEngine {
    /// Runs the day. Returns a solo victory when the first vote of the
    /// session eliminates the solo participant.
    #[instrument(skip_all, fields(venue = %session.venue(), round = session.round()))]
    pub(crate) async fn run_day(
        &mut self,
        session: &mut Session,
        ticket: &SessionTicket,
    ) -> Option<Victory> {
        session.begin_day();
        ticket.publish(session);

        if !session.tie_breaker_elected() {
            self.elect_captain(session).await;
        }

        let discussion = self.config.timings.discussion;
        self.announce(
            session.venue(),
            Announcement::DiscussionOpened {
                round: session.round(),
                duration: discussion,
            },
        )
        .await;
        tokio::time::sleep(discussion).await;

        session.begin_voting();
        ticket.publish(session);
        let eliminated = self.village_vote(session).await;

        let casualties = match eliminated {
            Some(target) => self.apply_step(session, &[(target, DeathCause::Vote)]).await,
            None => Vec::new(),
        };
        info!(?eliminated, casualties = casualties.len(), "day resolved");
        self.announce_casualties(session, &casualties).await;

        session.settle_solo(eliminated)
    }

    async fn elect_captain(&mut self, session: &mut Session) {
        let voters: Vec<ParticipantId> = session.alive().iter().copied().collect();
        let prompt = Prompt::new(
            PromptKind::CaptainElection,
            voters.iter().copied().map(Choice::Target).collect(),
        );
        let collected = self
            .collector
            .collect(&voters, &prompt, self.config.timings.captain_election)
            .await;

        let leaders = Tally::from_ballots(&collected.ballots()).leaders();
        let captain = self.draw(&leaders);
        info!(?captain, "captain elected");
        session.elect_tie_breaker(captain);
        session.record(
            GameEventKind::CaptainElected(CaptainElected { captain }),
            self.clock.as_ref(),
        );

        let captain = match captain {
            Some(p) => Some(self.named(p).await),
            None => None,
        };
        self.announce(session.venue(), Announcement::CaptainElected { captain })
            .await;
    }

    async fn village_vote(&mut self, session: &mut Session) -> Option<ParticipantId> {
        self.announce(
            session.venue(),
            Announcement::VotingOpened {
                round: session.round(),
            },
        )
        .await;

        let voters: Vec<ParticipantId> = session.alive().iter().copied().collect();
        let prompt = Prompt::new(
            PromptKind::VillageVote,
            voters.iter().copied().map(Choice::Target).collect(),
        )
        .excluding_self();
        let collected = self
            .collector
            .collect(&voters, &prompt, self.config.timings.village_vote)
            .await;

        let mut ballots = Vec::new();
        for (voter, target) in collected.ballots() {
            match session.cast_vote(voter, target) {
                Ok(()) => ballots.push((voter, target)),
                Err(error) => warn!(%voter, %error, "ballot rejected"),
            }
        }

        let tally = Tally::from_ballots(&ballots);
        let leaders = tally.leaders();
        let support = leaders.first().map_or(0, |t| tally.count(*t));
        info!(
            ballots = session.votes().len(),
            support,
            ?leaders,
            "village vote closed"
        );
        session.record(
            GameEventKind::VoteTallied(VoteTallied {
                ballots,
                leaders: leaders.clone(),
            }),
            self.clock.as_ref(),
        );

        match leaders.as_slice() {
            [] => None,
            [single] => Some(*single),
            tied => Some(self.break_tie(session, tied).await),
        }
    }

    /// Lets a living captain pick among `tied`, falling back to a uniform draw.
    async fn break_tie(&mut self, session: &mut Session, tied: &[ParticipantId]) -> ParticipantId {
        let mut named = Vec::with_capacity(tied.len());
        for participant in tied {
            named.push(self.named(*participant).await);
        }
        self.announce(session.venue(), Announcement::VoteTied { tied: named })
            .await;

        let mut by_captain = None;
        if let Some(captain) = session.tie_breaker().filter(|c| session.is_alive(*c)) {
            let prompt = Prompt::new(
                PromptKind::TieBreak,
                tied.iter().copied().map(Choice::Target).collect(),
            );
            if let Some(Choice::Target(chosen)) = self
                .collector
                .collect_one(captain, &prompt, self.config.timings.tie_break)
                .await
            {
                by_captain = Some(chosen);
            }
        }

        let chosen = by_captain
            .or_else(|| self.draw(tied))
            .unwrap_or(tied[0]);
        info!(%chosen, by_captain = by_captain.is_some(), "tie broken");
        session.record(
            GameEventKind::TieBroken(TieBroken {
                tied: tied.to_vec(),
                chosen,
                by_captain: by_captain.is_some(),
            }),
            self.clock.as_ref(),
        );
        chosen
    }

    /// Uniform draw among `candidates`; `None` when there are none.
    fn draw(&mut self, candidates: &[ParticipantId]) -> Option<ParticipantId> {
        match candidates {
            [] => None,
            [only] => Some(*only),
            _ => pick_index(self.rng.as_mut(), candidates.len()).map(|i| candidates[i]),
        }
    }
}
