//! End-to-end game scenarios driven through the command handlers.
//!
//! Every test runs with paused time, so deadlines elapse instantly. With
//! `MockRng` the dealt deck is the catalog order rotated left by one:
//! for `werewolf:1, villager:3` players 1-3 are villagers and 4 is the wolf.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{casualty_steps, engine, event_types, p, start_game, VENUE};
use lupus_core::catalog::{Role, Victory};
use lupus_core::error::DomainError;
use lupus_core::messaging::{Announcement, Choice, DeathCause, Notice, PromptKind};
use lupus_game::application::command_handlers::{handle_cancel_game, handle_start_game};
use lupus_game::application::engine::GameOutcome;
use lupus_game::application::query_handlers::get_session_status;
use lupus_game::application::store::SessionStore;
use lupus_game::domain::commands::CancelGame;
use lupus_game::domain::distribution::RoleDistribution;
use lupus_game::domain::events::GameEventKind;
use lupus_game::domain::session::Phase;
use lupus_test_support::{Delivery, MockRng, ScriptedMessenger, SequenceRng};
use tokio::time::Instant;
use uuid::Uuid;

fn one_wolf_three_villagers() -> RoleDistribution {
    RoleDistribution::new()
        .with(Role::Werewolf, 1)
        .with(Role::Villager, 3)
}

#[tokio::test(start_paused = true)]
async fn test_village_votes_out_the_wolf_after_losing_one_villager() {
    // Arrange
    let messenger = Arc::new(
        ScriptedMessenger::new()
            .reply(p(4), PromptKind::PackVote, Choice::Target(p(1)))
            .reply(p(2), PromptKind::VillageVote, Choice::Target(p(4)))
            .reply(p(3), PromptKind::VillageVote, Choice::Target(p(4))),
    );
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();
    let command = start_game(4, one_wolf_three_villagers());

    // Act
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    // Assert
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Village));
    assert_eq!(report.rounds, 1);
    assert_eq!(report.survivors, vec![p(2), p(3)]);
    assert_eq!(report.winners, vec![p(1), p(2), p(3)]);

    let steps = casualty_steps(&report);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0][0].participant, p(1));
    assert_eq!(steps[0][0].cause, DeathCause::Pack);
    assert_eq!(steps[1][0].participant, p(4));
    assert_eq!(steps[1][0].cause, DeathCause::Vote);

    // The night step did not end the game: the day vote followed it.
    let types = event_types(&report);
    let night = types.iter().position(|t| *t == "game.casualties_applied").unwrap();
    let vote = types.iter().position(|t| *t == "game.vote_tallied").unwrap();
    assert!(night < vote);
    assert_eq!(types.last(), Some(&"game.victory_declared"));
    assert!(!store.is_active(VENUE));
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_participant_aborts_before_any_role_is_dealt() {
    // Arrange
    let messenger = Arc::new(ScriptedMessenger::new().unreachable(p(3)));
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();
    let command = start_game(4, one_wolf_three_villagers());

    // Act
    let result = handle_start_game(&command, &mut engine, &store).await;

    // Assert
    match result.unwrap_err() {
        DomainError::Unreachable(participant) => assert_eq!(participant, p(3)),
        other => panic!("expected Unreachable, got {other:?}"),
    }
    assert!(messenger.deliveries().is_empty());
    assert!(!store.is_active(VENUE));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_reachability_check_stops_setup() {
    // Arrange: participant 2 takes 10s to answer the reachability check.
    let messenger = Arc::new(
        ScriptedMessenger::new().slow_reachability(p(2), Duration::from_secs(10)),
    );
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();
    let command = start_game(4, one_wolf_three_villagers());

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        let view = get_session_status(VENUE, &store).unwrap();
        assert_eq!(view.phase, Phase::Setup);
        handle_cancel_game(
            &CancelGame {
                correlation_id: Uuid::new_v4(),
                venue: VENUE,
            },
            &store,
        )
        .unwrap();
    };

    // Act
    let (result, ()) = tokio::join!(
        handle_start_game(&command, &mut engine, &store),
        canceller
    );

    // Assert
    match result.unwrap_err() {
        DomainError::Cancelled(venue) => assert_eq!(venue, VENUE),
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(!messenger
        .deliveries()
        .iter()
        .any(|d| matches!(d, Delivery::Notice { .. })));
    assert!(!store.is_active(VENUE));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_distribution_is_rejected_without_prompts() {
    let messenger = Arc::new(ScriptedMessenger::new());
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();
    let command = start_game(
        5,
        RoleDistribution::new()
            .with(Role::Werewolf, 1)
            .with(Role::Villager, 3),
    );

    let result = handle_start_game(&command, &mut engine, &store).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(messenger.deliveries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_roles_are_revealed_privately_to_their_holder_only() {
    let messenger = Arc::new(
        ScriptedMessenger::new()
            .reply(p(4), PromptKind::PackVote, Choice::Target(p(1)))
            .reply(p(2), PromptKind::VillageVote, Choice::Target(p(4)))
            .reply(p(3), PromptKind::VillageVote, Choice::Target(p(4))),
    );
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    let command = start_game(4, one_wolf_three_villagers());
    handle_start_game(&command, &mut engine, &store).await.unwrap();

    assert_eq!(
        messenger.notices_to(p(4)),
        vec![Notice::RoleAssigned { role: Role::Werewolf }]
    );
    for villager in [p(1), p(2), p(3)] {
        assert_eq!(
            messenger.notices_to(villager),
            vec![Notice::RoleAssigned { role: Role::Villager }]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_posthumous_strike_on_bonded_member_kills_both_partners() {
    // Arrange: deck rotates to villagers 1-3, hunter 4, cupid 5, wolf 6.
    let distribution = RoleDistribution::new()
        .with(Role::Werewolf, 1)
        .with(Role::Villager, 3)
        .with(Role::Hunter, 1)
        .with(Role::Cupid, 1);
    let mut script = ScriptedMessenger::new()
        .reply(p(5), PromptKind::Bond, Choice::Bond(p(1), p(2)))
        .reply(p(6), PromptKind::PackVote, Choice::Target(p(3)))
        .reply(p(4), PromptKind::PosthumousStrike, Choice::Target(p(1)))
        .reply(p(4), PromptKind::VillageVote, Choice::Target(p(6)));
    for voter in [1, 2, 5, 6] {
        script = script.reply(p(voter), PromptKind::VillageVote, Choice::Target(p(4)));
    }
    let messenger = Arc::new(script);
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    // Act
    let command = start_game(6, distribution);
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    // Assert
    let steps = casualty_steps(&report);
    assert_eq!(steps.len(), 2);
    let day: Vec<_> = steps[1].iter().map(|c| (c.participant, c.cause)).collect();
    assert_eq!(
        day,
        vec![
            (p(4), DeathCause::Vote),
            (p(1), DeathCause::Strike),
            (p(2), DeathCause::Heartbreak),
        ]
    );
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Wolves));
    assert_eq!(report.survivors, vec![p(5), p(6)]);
    assert_eq!(messenger.notices_to(p(1)).last(), Some(&Notice::Bonded { partner: p(2) }));
}

#[tokio::test(start_paused = true)]
async fn test_silent_captain_tie_is_settled_by_draw_within_deadline() {
    // Arrange: villagers 1-4, wolf 5. Everyone elects 1, who then ignores
    // the tie-break. Ballot arrival order makes the tie [2, 5].
    let distribution = RoleDistribution::new()
        .with(Role::Werewolf, 1)
        .with(Role::Villager, 4);
    let mut script = ScriptedMessenger::new();
    for voter in 1..=5 {
        script = script.reply(p(voter), PromptKind::CaptainElection, Choice::Target(p(1)));
    }
    let ballots = [(3, 2, 1), (4, 2, 2), (1, 5, 3), (2, 5, 4), (5, 1, 5)];
    for (voter, target, secs) in ballots {
        script = script.reply_after(
            p(voter),
            PromptKind::VillageVote,
            Duration::from_secs(secs),
            Choice::Target(p(target)),
        );
    }
    let messenger = Arc::new(script);
    // Four zeros keep the deal in rotated catalog order; the fifth value
    // draws index 1 of the tie.
    let mut engine = engine(&messenger, SequenceRng::new(vec![0, 0, 0, 0, 1]));
    let store = SessionStore::new();
    let started = Instant::now();

    // Act
    let command = start_game(5, distribution);
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    // Assert
    let tie = report
        .history
        .iter()
        .find_map(|event| match &event.kind {
            GameEventKind::TieBroken(tie) => Some(tie.clone()),
            _ => None,
        })
        .expect("tie should be recorded");
    assert_eq!(tie.tied, vec![p(2), p(5)]);
    assert_eq!(tie.chosen, p(5));
    assert!(!tie.by_captain);
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Village));
    assert_eq!(
        messenger.prompts_to(p(1)).last().map(|pr| pr.kind),
        Some(PromptKind::TieBreak)
    );

    // Silent pack 45s + discussion 60s + last ballot 5s + tie-break 30s.
    assert!(started.elapsed() <= Duration::from_secs(141));
}

#[tokio::test(start_paused = true)]
async fn test_responsive_captain_decides_the_tie() {
    let distribution = RoleDistribution::new()
        .with(Role::Werewolf, 1)
        .with(Role::Villager, 4);
    let mut script = ScriptedMessenger::new()
        .reply(p(1), PromptKind::TieBreak, Choice::Target(p(5)));
    for voter in 1..=5 {
        script = script.reply(p(voter), PromptKind::CaptainElection, Choice::Target(p(1)));
    }
    for (voter, target, secs) in [(3, 2, 1), (4, 2, 2), (1, 5, 3), (2, 5, 4)] {
        script = script.reply_after(
            p(voter),
            PromptKind::VillageVote,
            Duration::from_secs(secs),
            Choice::Target(p(target)),
        );
    }
    let messenger = Arc::new(script);
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    let command = start_game(5, distribution);
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    let tie = report
        .history
        .iter()
        .find_map(|event| match &event.kind {
            GameEventKind::TieBroken(tie) => Some(tie.clone()),
            _ => None,
        })
        .expect("tie should be recorded");
    assert!(tie.by_captain);
    assert_eq!(tie.chosen, p(5));
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Village));
}

#[tokio::test(start_paused = true)]
async fn test_night_abilities_resolve_in_order_across_two_nights() {
    // Arrange: deck rotates to wolf 1, villagers 2-3, seer 4, witch 5, wolf 6.
    let distribution = RoleDistribution::new()
        .with(Role::Werewolf, 2)
        .with(Role::Villager, 2)
        .with(Role::Seer, 1)
        .with(Role::Witch, 1);
    let mut script = ScriptedMessenger::new()
        .reply_after(p(1), PromptKind::PackVote, Duration::from_secs(1), Choice::Target(p(2)))
        .reply_after(p(6), PromptKind::PackVote, Duration::from_secs(2), Choice::Target(p(3)))
        .reply(p(6), PromptKind::PackVote, Choice::Target(p(4)))
        .reply(p(4), PromptKind::Reveal, Choice::Target(p(1)))
        .reply(p(5), PromptKind::Potions, Choice::Heal(p(2)))
        .reply(p(5), PromptKind::Potions, Choice::Poison(p(6)));
    for voter in 2..=5 {
        script = script.reply(p(voter), PromptKind::VillageVote, Choice::Target(p(1)));
    }
    let messenger = Arc::new(script);
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    // Act
    let command = start_game(6, distribution);
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    // Assert
    let pack_targets: Vec<_> = report
        .history
        .iter()
        .filter_map(|event| match &event.kind {
            GameEventKind::PackTargetChosen(chosen) => Some(chosen.target),
            _ => None,
        })
        .collect();
    assert_eq!(pack_targets, vec![Some(p(2)), Some(p(4))]);

    assert!(messenger.notices_to(p(4)).contains(&Notice::Revealed {
        target: p(1),
        role: Role::Werewolf,
    }));

    let steps = casualty_steps(&report);
    let causes: Vec<Vec<_>> = steps
        .iter()
        .map(|step| step.iter().map(|c| (c.participant, c.cause)).collect())
        .collect();
    assert_eq!(
        causes,
        vec![
            vec![(p(1), DeathCause::Vote)],
            vec![(p(4), DeathCause::Pack), (p(6), DeathCause::Poison)],
        ]
    );
    assert!(messenger
        .announcements()
        .contains(&Announcement::NoCasualties { round: 1 }));
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Village));
    assert_eq!(report.rounds, 2);
}

#[tokio::test(start_paused = true)]
async fn test_angel_voted_out_first_wins_alone() {
    // Arrange: deck rotates to villagers 1-2, angel 3, wolf 4.
    let distribution = RoleDistribution::new()
        .with(Role::Werewolf, 1)
        .with(Role::Villager, 2)
        .with(Role::Angel, 1);
    let mut script = ScriptedMessenger::new();
    for voter in [1, 2, 4] {
        script = script.reply(p(voter), PromptKind::VillageVote, Choice::Target(p(3)));
    }
    let messenger = Arc::new(script);
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    // Act
    let command = start_game(4, distribution);
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    // Assert
    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Solo(p(3))));
    assert_eq!(report.winners, vec![p(3)]);
    assert_eq!(report.rounds, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_broadcasts_do_not_abort_the_game() {
    let messenger = Arc::new(
        ScriptedMessenger::new()
            .failing_broadcasts()
            .reply(p(4), PromptKind::PackVote, Choice::Target(p(1)))
            .reply(p(2), PromptKind::VillageVote, Choice::Target(p(4)))
            .reply(p(3), PromptKind::VillageVote, Choice::Target(p(4))),
    );
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();

    let command = start_game(4, one_wolf_three_villagers());
    let report = handle_start_game(&command, &mut engine, &store).await.unwrap();

    assert_eq!(report.outcome, GameOutcome::Victory(Victory::Village));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_the_running_wait_and_skips_victory() {
    // Arrange: nobody ever answers, so the game would otherwise loop.
    let messenger = Arc::new(ScriptedMessenger::new());
    let mut engine = engine(&messenger, MockRng);
    let store = SessionStore::new();
    let command = start_game(4, one_wolf_three_villagers());

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(100)).await;
        let view = get_session_status(VENUE, &store).unwrap();
        assert_eq!(view.phase, Phase::Day);
        assert_eq!(view.alive.len(), 4);
        handle_cancel_game(
            &CancelGame {
                correlation_id: Uuid::new_v4(),
                venue: VENUE,
            },
            &store,
        )
        .unwrap();
    };

    // Act
    let (report, ()) = tokio::join!(
        handle_start_game(&command, &mut engine, &store),
        canceller
    );

    // Assert
    let report = report.unwrap();
    assert_eq!(report.outcome, GameOutcome::Cancelled);
    let types = event_types(&report);
    assert_eq!(types.last(), Some(&"game.cancelled"));
    assert!(!types.contains(&"game.victory_declared"));
    assert_eq!(messenger.announcements().last(), Some(&Announcement::Cancelled));
    assert!(!store.is_active(VENUE));
    assert!(matches!(
        get_session_status(VENUE, &store),
        Err(DomainError::SessionNotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_second_game_in_busy_venue_is_rejected() {
    let store = SessionStore::new();
    let _ticket = store.open(VENUE).unwrap();
    let messenger = Arc::new(ScriptedMessenger::new());
    let mut engine = engine(&messenger, MockRng);

    let command = start_game(4, one_wolf_three_villagers());
    let result = handle_start_game(&command, &mut engine, &store).await;

    assert!(matches!(result, Err(DomainError::SessionAlreadyRunning(VENUE))));
    assert!(!messenger
        .deliveries()
        .iter()
        .any(|d| matches!(d, Delivery::Notice { .. })));
}
