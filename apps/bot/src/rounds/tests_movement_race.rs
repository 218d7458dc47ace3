use std::time::Duration;

use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::PlayerStatus;
use crate::effects::Effect;
use crate::errors::domain::ValidationKind;
use crate::rounds::movement_race::{progress_for, Light, MovementRace};
use crate::rounds::test_support::{act, ctx_with, fire, secs, status_of};
use crate::rounds::{RoundContext, RoundOutcome, RoundProtocol};

fn race_timings(eliminate_unfinished: bool) -> Timings {
    let mut t = Timings::default();
    t.race.prep = Duration::ZERO;
    t.race.duration = secs(2.0);
    t.race.flip_min = secs(1.0);
    t.race.flip_max = secs(1.0);
    t.race.full_progress = secs(1.0);
    t.race.eliminate_unfinished = eliminate_unfinished;
    t
}

fn progress(ctx: &RoundContext, id: i64) -> u8 {
    ctx.player(id)
        .and_then(|p| p.round_state.race())
        .map_or(0, |lane| lane.progress)
}

#[test]
fn test_injected_green_run_then_stop_keeps_player_alive_at_forty() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(4, race_timings(false), 7);
    race.start(&mut ctx);
    fire(&mut race, &mut ctx);
    assert_eq!(race.light(), Light::Red);
    assert_eq!(ctx.deadline(), Some(secs(1.0)));

    race.inject_light(&mut ctx, Light::Green);
    act(&mut race, &mut ctx, secs(0.5), 1, PlayerAction::Run).unwrap();
    act(&mut race, &mut ctx, secs(0.9), 1, PlayerAction::Stop).unwrap();
    assert_eq!(progress(&ctx, 1), 40);

    // flip at t=1 finds nobody running
    fire(&mut race, &mut ctx);
    assert_eq!(race.light(), Light::Red);
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);

    fire(&mut race, &mut ctx);
    assert_eq!(ctx.outcome(), Some(RoundOutcome::Completed));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
    assert_eq!(progress(&ctx, 1), 40);
    assert_eq!(ctx.active_count(), 4);
}

#[test]
fn test_runner_caught_by_red_light_is_eliminated_and_restricted() {
    let mut race = MovementRace::new();
    let mut t = race_timings(false);
    t.race.duration = secs(5.0);
    let mut ctx = ctx_with(3, t, 1);
    race.start(&mut ctx);
    fire(&mut race, &mut ctx);
    fire(&mut race, &mut ctx);
    assert_eq!(race.light(), Light::Green);
    ctx.take_effects();

    act(&mut race, &mut ctx, secs(1.2), 2, PlayerAction::Run).unwrap();
    fire(&mut race, &mut ctx);

    assert_eq!(status_of(&ctx, 2), PlayerStatus::Eliminated);
    let effects = ctx.take_effects();
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Restrict { player: 2, .. })));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
}

#[test]
fn test_action_on_red_eliminates() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(2, race_timings(false), 1);
    race.start(&mut ctx);
    fire(&mut race, &mut ctx);
    assert_eq!(race.light(), Light::Red);

    act(&mut race, &mut ctx, secs(0.3), 1, PlayerAction::Run).unwrap();
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Eliminated);

    let err = act(&mut race, &mut ctx, secs(0.4), 1, PlayerAction::Stop).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAlive));
}

#[test]
fn test_stop_banks_progress_once() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(2, race_timings(true), 1);
    race.start(&mut ctx);
    fire(&mut race, &mut ctx);
    race.inject_light(&mut ctx, Light::Green);

    act(&mut race, &mut ctx, secs(0.0), 1, PlayerAction::Run).unwrap();
    act(&mut race, &mut ctx, secs(0.9), 1, PlayerAction::Stop).unwrap();
    let err = act(&mut race, &mut ctx, secs(0.95), 1, PlayerAction::Stop).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotRunning));
    assert_eq!(progress(&ctx, 1), 90);
}

#[test]
fn test_full_run_crosses_line_and_ignores_red() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(2, race_timings(true), 1);
    race.start(&mut ctx);
    fire(&mut race, &mut ctx);
    race.inject_light(&mut ctx, Light::Green);

    act(&mut race, &mut ctx, secs(0.0), 1, PlayerAction::Run).unwrap();
    act(&mut race, &mut ctx, secs(0.99), 1, PlayerAction::Stop).unwrap();
    assert_eq!(progress(&ctx, 1), 99);
    act(&mut race, &mut ctx, secs(0.99), 1, PlayerAction::Run).unwrap();
    act(&mut race, &mut ctx, secs(1.5), 1, PlayerAction::Stop).unwrap();
    assert_eq!(progress(&ctx, 1), 100);

    race.inject_light(&mut ctx, Light::Red);
    let err = act(&mut race, &mut ctx, secs(1.6), 1, PlayerAction::Run).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyFinished));
    assert_eq!(status_of(&ctx, 1), PlayerStatus::Alive);
}

#[test]
fn test_unfinished_players_fall_when_configured() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(3, race_timings(true), 1);
    race.start(&mut ctx);
    while !ctx.is_complete() {
        fire(&mut race, &mut ctx);
    }
    assert_eq!(ctx.active_count(), 0);
}

#[test]
fn test_waiting_and_double_run_are_rejected() {
    let mut race = MovementRace::new();
    let mut t = race_timings(false);
    t.race.prep = secs(5.0);
    let mut ctx = ctx_with(2, t, 1);
    race.start(&mut ctx);

    let err = act(&mut race, &mut ctx, secs(1.0), 1, PlayerAction::Run).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::WrongPhase));

    fire(&mut race, &mut ctx);
    race.inject_light(&mut ctx, Light::Green);
    act(&mut race, &mut ctx, secs(5.1), 1, PlayerAction::Run).unwrap();
    let err = act(&mut race, &mut ctx, secs(5.2), 1, PlayerAction::Run).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyActed));
    let err = act(&mut race, &mut ctx, secs(5.2), 2, PlayerAction::Stop).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotRunning));
}

#[test]
fn test_foreign_action_is_silent() {
    let mut race = MovementRace::new();
    let mut ctx = ctx_with(2, race_timings(false), 1);
    race.start(&mut ctx);
    let err = act(&mut race, &mut ctx, secs(0.0), 1, PlayerAction::Vote("p2".into())).unwrap_err();
    assert!(err.is_silent());
}

#[test]
fn test_progress_for_rounds_down_and_clamps() {
    assert_eq!(progress_for(secs(0.4), secs(1.0)), 40);
    assert_eq!(progress_for(secs(0.0049), secs(1.0)), 0);
    assert_eq!(progress_for(secs(3.0), secs(1.0)), 100);
    assert_eq!(progress_for(secs(1.0), Duration::ZERO), 100);
}
