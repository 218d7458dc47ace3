use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::domain::round_state::Signal;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::partner_trust::{Pairing, PartnerTrust};
use crate::rounds::test_support::{act_now, ctx_with, fire, status_of};
use crate::rounds::{RoundContext, RoundOutcome, RoundProtocol};

fn pick(
    game: &mut PartnerTrust,
    ctx: &mut RoundContext,
    actor: i64,
    target: &str,
) -> Result<(), DomainError> {
    act_now(game, ctx, actor, PlayerAction::Pick(target.to_string()))
}

fn choose(game: &mut PartnerTrust, ctx: &mut RoundContext, actor: i64, signal: Signal) {
    act_now(game, ctx, actor, PlayerAction::Choose(signal)).unwrap();
}

fn open_pairing(players: i64) -> (PartnerTrust, RoundContext) {
    let mut game = PartnerTrust::new();
    let mut ctx = ctx_with(players, Timings::default(), 21);
    game.start(&mut ctx);
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "pairing");
    (game, ctx)
}

#[test]
fn test_pairing_requires_mutual_picks() {
    let (mut game, mut ctx) = open_pairing(4);
    pick(&mut game, &mut ctx, 1, "@p2").unwrap();
    assert!(game.pairs().is_empty());
    pick(&mut game, &mut ctx, 2, "p1").unwrap();
    assert_eq!(game.pairs(), &[Pairing { a: 1, b: 2 }]);
    assert_eq!(
        ctx.player(1).and_then(|p| p.round_state.trust()).and_then(|s| s.partner),
        Some(2)
    );
}

#[test]
fn test_pick_can_be_changed_before_confirmation() {
    let (mut game, mut ctx) = open_pairing(4);
    pick(&mut game, &mut ctx, 1, "p2").unwrap();
    pick(&mut game, &mut ctx, 1, "p3").unwrap();
    pick(&mut game, &mut ctx, 2, "p1").unwrap();
    assert!(game.pairs().is_empty());
    pick(&mut game, &mut ctx, 3, "p1").unwrap();
    assert_eq!(game.pairs(), &[Pairing { a: 1, b: 3 }]);
}

#[test]
fn test_pick_rejections() {
    let (mut game, mut ctx) = open_pairing(4);
    let err = pick(&mut game, &mut ctx, 1, "p1").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::SelfTarget));
    let err = pick(&mut game, &mut ctx, 1, "nobody").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::UnknownTarget));

    pick(&mut game, &mut ctx, 1, "p2").unwrap();
    pick(&mut game, &mut ctx, 2, "p1").unwrap();
    let err = pick(&mut game, &mut ctx, 1, "p3").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyPaired));
    let err = pick(&mut game, &mut ctx, 3, "p2").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::TargetUnavailable));
}

#[test]
fn test_full_round_applies_payoffs_and_defaults_to_defect() {
    let (mut game, mut ctx) = open_pairing(7);
    for (a, b) in [(1, "p2"), (2, "p1"), (3, "p4"), (4, "p3"), (5, "p6"), (6, "p5")] {
        pick(&mut game, &mut ctx, a, b).unwrap();
    }
    fire(&mut game, &mut ctx);
    assert_eq!(status_of(&ctx, 7), PlayerStatus::Eliminated);
    assert_eq!(game.phase(), "choice_intro");

    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Choose(Signal::Cooperate)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "choice");

    choose(&mut game, &mut ctx, 1, Signal::Cooperate);
    choose(&mut game, &mut ctx, 2, Signal::Cooperate);
    choose(&mut game, &mut ctx, 3, Signal::Cooperate);
    choose(&mut game, &mut ctx, 4, Signal::Defect);
    choose(&mut game, &mut ctx, 5, Signal::Cooperate);
    let err = act_now(&mut game, &mut ctx, 5, PlayerAction::Choose(Signal::Defect)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyActed));
    fire(&mut game, &mut ctx);

    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 3), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 4), PlayerStatus::Alive);
    // 6 never chose: counts as betrayal against a cooperating partner
    assert_eq!(status_of(&ctx, 5), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 6), PlayerStatus::Alive);
}

#[test]
fn test_no_pairs_completes_after_pairing() {
    let (mut game, mut ctx) = open_pairing(3);
    fire(&mut game, &mut ctx);
    assert!(ctx.is_complete());
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_unpaired_player_cannot_choose() {
    let (mut game, mut ctx) = open_pairing(3);
    pick(&mut game, &mut ctx, 1, "p2").unwrap();
    pick(&mut game, &mut ctx, 2, "p1").unwrap();
    fire(&mut game, &mut ctx);
    fire(&mut game, &mut ctx);
    let err = act_now(&mut game, &mut ctx, 3, PlayerAction::Choose(Signal::Cooperate)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAlive));
}

#[test]
fn test_force_resolve_during_choice_uses_recorded_choices() {
    let (mut game, mut ctx) = open_pairing(2);
    pick(&mut game, &mut ctx, 1, "p2").unwrap();
    pick(&mut game, &mut ctx, 2, "p1").unwrap();
    fire(&mut game, &mut ctx);
    fire(&mut game, &mut ctx);
    choose(&mut game, &mut ctx, 1, Signal::Defect);
    game.force_resolve(&mut ctx);
    assert!(ctx.is_complete());
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Eliminated);
}
