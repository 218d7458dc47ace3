use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::domain::round_state::Shape;
use crate::errors::domain::ValidationKind;
use crate::rounds::shape_guess::ShapeGuess;
use crate::rounds::test_support::{act, ctx_with, fire, secs, status_of};
use crate::rounds::{RoundOutcome, RoundProtocol};

fn wrong_shape(game: &ShapeGuess) -> Shape {
    Shape::ALL
        .into_iter()
        .find(|s| !game.correct().contains(s))
        .unwrap()
}

#[test]
fn test_resolution_eliminates_wrong_and_missing_guesses() {
    let mut game = ShapeGuess::new();
    let mut ctx = ctx_with(4, Timings::default(), 11);
    game.start(&mut ctx);
    assert_eq!(game.phase(), "thinking");
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "guessing");

    let now = ctx.now();
    let [good_a, good_b] = game.correct();
    let bad = wrong_shape(&game);
    act(&mut game, &mut ctx, now, 1, PlayerAction::Guess(good_a)).unwrap();
    act(&mut game, &mut ctx, now, 2, PlayerAction::Guess(good_b)).unwrap();
    act(&mut game, &mut ctx, now, 3, PlayerAction::Guess(bad)).unwrap();
    fire(&mut game, &mut ctx);

    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 3), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 4), PlayerStatus::Eliminated);
}

#[test]
fn test_guess_during_thinking_is_rejected_without_cooldown() {
    let mut game = ShapeGuess::new();
    let mut ctx = ctx_with(2, Timings::default(), 3);
    game.start(&mut ctx);

    let err = act(&mut game, &mut ctx, secs(1.0), 1, PlayerAction::Guess(Shape::Circle)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));

    fire(&mut game, &mut ctx);
    let now = ctx.now();
    act(&mut game, &mut ctx, now, 1, PlayerAction::Guess(Shape::Circle)).unwrap();
}

#[test]
fn test_second_guess_is_cooldown_then_already_acted() {
    let mut game = ShapeGuess::new();
    let mut ctx = ctx_with(2, Timings::default(), 3);
    game.start(&mut ctx);
    fire(&mut game, &mut ctx);
    let now = ctx.now();

    act(&mut game, &mut ctx, now, 1, PlayerAction::Guess(Shape::Square)).unwrap();
    let err = act(&mut game, &mut ctx, now + secs(0.5), 1, PlayerAction::Guess(Shape::Circle))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::Cooldown));
    assert!(err.is_silent());

    let err = act(&mut game, &mut ctx, now + secs(2.0), 1, PlayerAction::Guess(Shape::Circle))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyActed));
    let kept = ctx
        .player(1)
        .and_then(|p| p.round_state.shape())
        .and_then(|c| c.guess);
    assert_eq!(kept, Some(Shape::Square));
}

#[test]
fn test_force_resolve_during_thinking_eliminates_everyone() {
    let mut game = ShapeGuess::new();
    let mut ctx = ctx_with(3, Timings::default(), 5);
    game.start(&mut ctx);
    game.force_resolve(&mut ctx);
    assert!(ctx.is_complete());
    assert_eq!(ctx.active_count(), 0);
    assert_eq!(ctx.deadline(), None);
}

#[test]
fn test_correct_pair_is_seed_stable() {
    let mut a = ShapeGuess::new();
    let mut b = ShapeGuess::new();
    let mut ctx_a = ctx_with(1, Timings::default(), 99);
    let mut ctx_b = ctx_with(1, Timings::default(), 99);
    a.start(&mut ctx_a);
    b.start(&mut ctx_b);
    assert_eq!(a.correct(), b.correct());
    assert_ne!(a.correct()[0], a.correct()[1]);
}
