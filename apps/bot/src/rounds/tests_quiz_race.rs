use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::quiz_race::{normalize_answer, QuizRace};
use crate::rounds::test_support::{act_now, ctx_with, fire, status_of};
use crate::rounds::{RoundContext, RoundOutcome, RoundProtocol};

fn bank(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("Question {i}?"), format!("Answer {i}")))
        .collect()
}

fn started(players: i64, questions: usize, win_score: u32) -> (QuizRace, RoundContext) {
    let mut timings = Timings::default();
    timings.quiz.win_score = win_score;
    let mut game = QuizRace::with_bank(bank(questions));
    let mut ctx = ctx_with(players, timings, 17);
    game.start(&mut ctx);
    assert_eq!(game.phase(), "asking");
    (game, ctx)
}

fn answer(game: &mut QuizRace, ctx: &mut RoundContext, who: i64) -> Result<(), DomainError> {
    let text = game.current_answer().unwrap().to_string();
    act_now(game, ctx, who, PlayerAction::Answer(text))
}

fn score(ctx: &RoundContext, id: i64) -> u32 {
    ctx.player(id).and_then(|p| p.round_state.quiz()).map_or(0, |q| q.score)
}

#[test]
fn test_normalize_answer() {
    assert_eq!(normalize_answer("  Mount   EVEREST "), "mount everest");
    assert_eq!(normalize_answer("ＰＡＲＩＳ"), "paris");
}

#[test]
fn test_first_correct_answer_scores_once() {
    let (mut game, mut ctx) = started(3, 5, 3);
    answer(&mut game, &mut ctx, 2).unwrap();
    assert!(game.answered());
    assert!(!game.accepts_free_text());

    let err = answer(&mut game, &mut ctx, 1).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyAnswered));
    assert!(err.is_silent());
    assert_eq!(score(&ctx, 2), 1);
    assert_eq!(score(&ctx, 1), 0);
    assert_eq!(game.phase(), "cooldown");
}

#[test]
fn test_wrong_answer_gets_a_reply() {
    let (mut game, mut ctx) = started(2, 5, 3);
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Answer("nope".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongAnswer));
    assert_eq!(err.user_message(), "Wrong answer! Keep trying!");
    assert!(game.accepts_free_text());
}

#[test]
fn test_reaching_win_score_crowns_and_eliminates_rest() {
    let (mut game, mut ctx) = started(3, 5, 2);
    answer(&mut game, &mut ctx, 3).unwrap();
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "asking");
    answer(&mut game, &mut ctx, 3).unwrap();

    assert_eq!(ctx.outcome(), Some(RoundOutcome::Champion(3)));
    assert_eq!(status_of(&ctx, 3), PlayerStatus::Winner);
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);
    assert_eq!(status_of(&ctx, 2), PlayerStatus::Eliminated);
}

#[test]
fn test_unanswered_question_times_out_into_cooldown() {
    let (mut game, mut ctx) = started(2, 5, 3);
    fire(&mut game, &mut ctx);
    assert_eq!(game.phase(), "cooldown");
    let err = act_now(&mut game, &mut ctx, 1, PlayerAction::Answer("x".into())).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));
}

#[test]
fn test_exhausted_bank_eliminates_everyone() {
    let (mut game, mut ctx) = started(2, 2, 3);
    while !ctx.is_complete() {
        fire(&mut game, &mut ctx);
    }
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_force_resolve_leaves_statuses_alone() {
    let (mut game, mut ctx) = started(2, 5, 3);
    answer(&mut game, &mut ctx, 1).unwrap();
    game.force_resolve(&mut ctx);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(ctx.active_count(), 2);
}
