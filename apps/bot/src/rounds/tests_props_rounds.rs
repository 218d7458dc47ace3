use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::round_state::{Shape, Signal};
use crate::rounds::movement_race::{progress_for, Light, MovementRace};
use crate::rounds::partner_trust::{payoff, PartnerTrust};
use crate::rounds::quiz_race::QuizRace;
use crate::rounds::shape_guess::pick_correct;
use crate::rounds::test_support::{act, act_now, ctx_with, fire};
use crate::rounds::vote::{candidates, draw, tally};
use crate::rounds::RoundProtocol;

fn signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Cooperate), Just(Signal::Defect)]
}

proptest! {
    #[test]
    fn prop_payoff_symmetric(a in signal(), b in signal()) {
        let (x, y) = payoff(a, b);
        let (y2, x2) = payoff(b, a);
        prop_assert_eq!((x, y), (x2, y2));
    }

    #[test]
    fn prop_correct_set_has_two_distinct_shapes(seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let pair = pick_correct(&mut rng);
        prop_assert_ne!(pair[0], pair[1]);
        let wrong = Shape::ALL.iter().filter(|s| !pair.contains(s)).count();
        prop_assert_eq!(wrong, 1);
    }

    #[test]
    fn prop_progress_clamped_and_monotonic(a in 0u64..10_000, b in 0u64..10_000, full in 1u64..5_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let full = Duration::from_millis(full);
        let p_lo = progress_for(Duration::from_millis(lo), full);
        let p_hi = progress_for(Duration::from_millis(hi), full);
        prop_assert!(p_lo <= p_hi);
        prop_assert!(p_hi <= 100);
    }

    /// Random RUN/STOP sequences on green never lower a lane's progress.
    #[test]
    fn prop_race_progress_never_decreases(steps in proptest::collection::vec((any::<bool>(), 1u64..400), 1..40)) {
        let mut timings = Timings::default();
        timings.race.prep = Duration::ZERO;
        timings.race.full_progress = Duration::from_secs(1);
        let mut race = MovementRace::new();
        let mut ctx = ctx_with(1, timings, 3);
        race.start(&mut ctx);
        fire(&mut race, &mut ctx);
        race.inject_light(&mut ctx, Light::Green);

        let mut now = Duration::ZERO;
        let mut last = 0u8;
        for (run, gap) in steps {
            now += Duration::from_millis(gap);
            let action = if run { PlayerAction::Run } else { PlayerAction::Stop };
            let _ = act(&mut race, &mut ctx, now, 1, action);
            let progress = ctx
                .player(1)
                .and_then(|p| p.round_state.race())
                .map_or(0, |lane| lane.progress);
            prop_assert!(progress >= last);
            prop_assert!(progress <= 100);
            last = progress;
        }
    }

    /// A pairing exists exactly when both sides picked each other.
    #[test]
    fn prop_pairing_iff_mutual(picks in proptest::collection::vec((1i64..=5, 1i64..=5), 0..20)) {
        let mut game = PartnerTrust::new();
        let mut ctx = ctx_with(5, Timings::default(), 8);
        game.start(&mut ctx);
        fire(&mut game, &mut ctx);
        for (from, to) in picks {
            let _ = act_now(&mut game, &mut ctx, from, PlayerAction::Pick(format!("p{to}")));
        }
        for pair in game.pairs() {
            let a = ctx.player(pair.a).and_then(|p| p.round_state.trust()).cloned().unwrap_or_default();
            let b = ctx.player(pair.b).and_then(|p| p.round_state.trust()).cloned().unwrap_or_default();
            prop_assert_eq!(a.pick, Some(pair.b));
            prop_assert_eq!(b.pick, Some(pair.a));
            prop_assert_eq!(a.partner, Some(pair.b));
        }
        for p in ctx.participants() {
            let slot = p.round_state.trust().cloned().unwrap_or_default();
            let paired = game.pairs().iter().any(|pair| pair.contains(p.id));
            prop_assert_eq!(slot.partner.is_some(), paired);
        }
    }

    /// However many answers arrive, one question yields at most one point.
    #[test]
    fn prop_quiz_one_point_per_question(order in proptest::collection::vec(1i64..=4, 1..12)) {
        let bank = vec![("Q?".to_string(), "yes".to_string()); 3];
        let mut game = QuizRace::with_bank(bank);
        let mut ctx = ctx_with(4, Timings::default(), 2);
        game.start(&mut ctx);
        for who in order {
            let _ = act_now(&mut game, &mut ctx, who, PlayerAction::Answer("yes".into()));
        }
        let total: u32 = ctx
            .participants()
            .iter()
            .map(|p| p.round_state.quiz().map_or(0, |q| q.score))
            .sum();
        prop_assert_eq!(total, 1);
    }
}

#[test]
fn test_tie_break_is_uniform_over_leaders() {
    let alive = [1, 2, 3, 4, 5];
    let counts = tally(&[(1, 2), (3, 4), (5, 2), (2, 4)], &alive);
    let pool = candidates(&counts, &alive);
    assert_eq!(pool, vec![2, 4]);

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut hits: HashMap<i64, u32> = HashMap::new();
    let trials = 4_000;
    for _ in 0..trials {
        *hits.entry(draw(&pool, &mut rng).unwrap()).or_default() += 1;
    }
    for id in &pool {
        let share = f64::from(hits[id]) / f64::from(trials);
        assert!((share - 0.5).abs() < 0.05, "player {id} drawn {share}");
    }
}

#[test]
fn test_no_vote_draw_is_uniform_over_alive() {
    let alive = [10, 20, 30, 40];
    let pool = candidates(&tally(&[], &alive), &alive);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut hits: HashMap<i64, u32> = HashMap::new();
    let trials = 8_000;
    for _ in 0..trials {
        *hits.entry(draw(&pool, &mut rng).unwrap()).or_default() += 1;
    }
    assert_eq!(hits.len(), 4);
    for id in alive {
        let share = f64::from(hits[&id]) / f64::from(trials);
        assert!((share - 0.25).abs() < 0.04, "player {id} drawn {share}");
    }
}
