use std::collections::BTreeMap;

use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::errors::domain::ValidationKind;
use crate::rounds::test_support::{act_now, ctx_with, fire, status_of};
use crate::rounds::vote::{candidates, tally, Vote};
use crate::rounds::{RoundContext, RoundOutcome, RoundProtocol};

fn vote(game: &mut Vote, ctx: &mut RoundContext, voter: i64, target: &str) {
    act_now(game, ctx, voter, PlayerAction::Vote(target.to_string())).unwrap();
}

fn opened(players: i64) -> (Vote, RoundContext) {
    let mut game = Vote::new();
    let mut ctx = ctx_with(players, Timings::default(), 5);
    game.start(&mut ctx);
    assert_eq!(game.phase(), "intro");
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "collecting");
    (game, ctx)
}

#[test]
fn test_tally_ignores_votes_for_non_alive() {
    let counts = tally(&[(1, 3), (2, 3), (4, 9)], &[1, 2, 3, 4]);
    assert_eq!(counts, BTreeMap::from([(3, 2)]));
}

#[test]
fn test_candidates_are_leaders_or_everyone() {
    let counts = BTreeMap::from([(3, 2), (4, 2), (5, 1)]);
    assert_eq!(candidates(&counts, &[1, 3, 4, 5]), vec![3, 4]);
    assert_eq!(candidates(&BTreeMap::new(), &[4, 1, 2]), vec![1, 2, 4]);
}

#[test]
fn test_plurality_leader_is_eliminated_then_pause() {
    let (mut game, mut ctx) = opened(5);
    vote(&mut game, &mut ctx, 1, "p3");
    vote(&mut game, &mut ctx, 2, "@P3");
    vote(&mut game, &mut ctx, 4, "p5");
    fire(&mut game, &mut ctx);

    assert_eq!(status_of(&ctx, 3), PlayerStatus::Eliminated);
    assert_eq!(ctx.active_count(), 4);
    assert_eq!(game.phase(), "pause");
    assert!(!ctx.is_complete());

    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "collecting");
    assert_eq!(game.ballot_no(), 2);
    let stale = ctx
        .player(1)
        .and_then(|p| p.round_state.ballot())
        .and_then(|b| b.vote_for);
    assert_eq!(stale, None);
}

#[test]
fn test_empty_ballot_still_eliminates_one() {
    let (mut game, mut ctx) = opened(4);
    fire(&mut game, &mut ctx);
    assert_eq!(ctx.active_count(), 3);
}

#[test]
fn test_ballot_closes_early_when_everyone_voted() {
    let (mut game, mut ctx) = opened(3);
    vote(&mut game, &mut ctx, 1, "p2");
    vote(&mut game, &mut ctx, 2, "p1");
    assert!(!ctx.is_complete());
    vote(&mut game, &mut ctx, 3, "p1");

    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::FinalDuel));
}

#[test]
fn test_last_vote_can_be_changed_before_close() {
    let (mut game, mut ctx) = opened(4);
    vote(&mut game, &mut ctx, 1, "p2");
    vote(&mut game, &mut ctx, 1, "p4");
    fire(&mut game, &mut ctx);
    assert_eq!(status_of(&ctx, 4), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Alive);
}

#[test]
fn test_vote_rejections() {
    let (mut game, mut ctx) = opened(4);
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Vote("p1".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::SelfTarget));
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Vote("ghost".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::UnknownTarget));

    vote(&mut game, &mut ctx, 1, "p2");
    vote(&mut game, &mut ctx, 3, "p2");
    fire(&mut game, &mut ctx);
    let err = act_now(&mut game, &mut ctx, 2, PlayerAction::Vote("p1".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));

    fire(&mut game, &mut ctx);
    let err = act_now(&mut game, &mut ctx, 2, PlayerAction::Vote("p1".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAlive));
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Vote("p2".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::TargetUnavailable));
}

#[test]
fn test_runs_until_two_remain() {
    let (mut game, mut ctx) = opened(6);
    while !ctx.is_complete() {
        fire(&mut game, &mut ctx);
    }
    assert_eq!(ctx.active_count(), 2);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::FinalDuel));
}

#[test]
fn test_force_resolve_closes_open_ballot_once() {
    let (mut game, mut ctx) = opened(5);
    vote(&mut game, &mut ctx, 1, "p2");
    game.force_resolve(&mut ctx);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Eliminated);
    assert_eq!(ctx.active_count(), 4);
}

#[test]
fn test_force_resolve_between_ballots_eliminates_nobody() {
    let mut game = Vote::new();
    let mut ctx = ctx_with(5, Timings::default(), 5);
    game.start(&mut ctx);
    game.force_resolve(&mut ctx);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.active_count(), 5);
}

#[test]
fn test_two_players_skip_to_final_duel() {
    let mut game = Vote::new();
    let mut ctx = ctx_with(2, Timings::default(), 5);
    game.start(&mut ctx);

    assert_eq!(ctx.outcome(), Some(RoundOutcome::FinalDuel));
    assert_eq!(ctx.deadline(), None);
    assert_eq!(ctx.active_count(), 2);
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Alive);
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Vote("p2".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));
}

#[test]
fn test_single_player_vote_is_skipped() {
    let mut game = Vote::new();
    let mut ctx = ctx_with(1, Timings::default(), 5);
    game.start(&mut ctx);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.active_count(), 1);
}
