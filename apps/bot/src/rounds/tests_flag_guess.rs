use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::effects::{Asset, Effect};
use crate::errors::domain::ValidationKind;
use crate::rounds::flag_guess::{FlagGuess, FLAGS};
use crate::rounds::test_support::{act_now, ctx_with, fire, status_of, texts};
use crate::rounds::{RoundContext, RoundOutcome, RoundProtocol};

fn showing(players: i64, rounds: u8) -> (FlagGuess, RoundContext) {
    let mut timings = Timings::default();
    timings.flag.rounds = rounds;
    let mut game = FlagGuess::new();
    let mut ctx = ctx_with(players, timings, 21);
    game.start(&mut ctx);
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "showing");
    (game, ctx)
}

fn answer(game: &mut FlagGuess, ctx: &mut RoundContext, id: i64, text: &str) {
    act_now(game, ctx, id, PlayerAction::Answer(text.to_string())).unwrap();
}

fn country(game: &FlagGuess) -> String {
    game.current_country().unwrap().to_string()
}

#[test]
fn test_flag_is_shown_after_prep() {
    let mut game = FlagGuess::new();
    let mut ctx = ctx_with(2, Timings::default(), 21);
    game.start(&mut ctx);
    assert_eq!(game.phase(), "prep");
    assert!(!game.accepts_free_text());
    assert!(game.answers_in_private());
    ctx.take_effects();

    fire(&mut game, &mut ctx);
    let effects = ctx.take_effects();
    let file = effects.iter().find_map(|e| match e {
        Effect::SendMedia {
            asset: Asset::Flag(file),
            ..
        } => Some(*file),
        _ => None,
    });
    let current = FLAGS.iter().find(|(c, _)| *c == country(&game)).map(|(_, f)| *f);
    assert_eq!(file, current);
    assert!(game.accepts_free_text());
    assert_eq!(game.flag_no(), 1);
}

#[test]
fn test_wrong_and_missing_answers_are_eliminated() {
    let (mut game, mut ctx) = showing(3, 1);
    let right = country(&game).to_uppercase();
    answer(&mut game, &mut ctx, 1, &right);
    answer(&mut game, &mut ctx, 2, "Atlantis");
    fire(&mut game, &mut ctx);

    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 3), PlayerStatus::Eliminated);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    let summary = texts(&ctx.take_effects()).join("\n");
    assert!(summary.contains("✅ Survivors: @p1"));
    assert!(summary.contains("❌ Eliminated: @p2, @p3"));
}

#[test]
fn test_only_one_try_per_flag() {
    let (mut game, mut ctx) = showing(2, 1);
    let right = country(&game);
    answer(&mut game, &mut ctx, 1, "Atlantis");
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Answer(right)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyActed));

    fire(&mut game, &mut ctx);
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);
}

#[test]
fn test_survivors_face_the_next_flag() {
    let (mut game, mut ctx) = showing(2, 2);
    let first = country(&game);
    answer(&mut game, &mut ctx, 1, &first);
    answer(&mut game, &mut ctx, 2, &first);
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "between");
    assert!(!ctx.is_complete());

    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Answer(first.clone())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));

    fire(&mut game, &mut ctx);
    assert_eq!(game.flag_no(), 2);
    assert_ne!(country(&game), first);
    let second = country(&game);
    answer(&mut game, &mut ctx, 2, &second);
    fire(&mut game, &mut ctx);

    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Alive);
}

#[test]
fn test_round_ends_when_nobody_survives_a_flag() {
    let (mut game, mut ctx) = showing(2, 3);
    fire(&mut game, &mut ctx);
    assert_eq!(ctx.active_count(), 0);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.deadline(), None);
}

#[test]
fn test_eliminated_players_cannot_answer() {
    let (mut game, mut ctx) = showing(2, 2);
    let first = country(&game);
    answer(&mut game, &mut ctx, 1, &first);
    fire(&mut game, &mut ctx);
    fire(&mut game, &mut ctx);

    let err = act_now(&mut game, &mut ctx, 2, PlayerAction::Answer("France".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAlive));
}

#[test]
fn test_force_resolve_judges_the_open_flag() {
    let (mut game, mut ctx) = showing(3, 2);
    let first = country(&game);
    answer(&mut game, &mut ctx, 1, &first);
    game.force_resolve(&mut ctx);

    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.active_count(), 1);
}

#[test]
fn test_force_resolve_before_a_flag_eliminates_nobody() {
    let mut game = FlagGuess::new();
    let mut ctx = ctx_with(3, Timings::default(), 21);
    game.start(&mut ctx);
    game.force_resolve(&mut ctx);
    assert!(ctx.is_complete());
    assert_eq!(ctx.active_count(), 3);
}
