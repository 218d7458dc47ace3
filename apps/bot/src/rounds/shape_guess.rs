//! Shape guess: two of three shapes are secretly correct.
//!
//! `thinking` accepts no input; during `guessing` each player gets exactly one
//! pick. At the guessing deadline a missing or wrong pick eliminates.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::domain::round_state::Shape;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePhase {
    Thinking,
    Guessing,
    Resolved,
}

pub struct ShapeGuess {
    phase: ShapePhase,
    correct: [Shape; 2],
}

/// Draw the two correct shapes uniformly from the three.
pub fn pick_correct<R: Rng + ?Sized>(rng: &mut R) -> [Shape; 2] {
    let mut all = Shape::ALL;
    all.shuffle(rng);
    let mut pair = [all[0], all[1]];
    pair.sort();
    pair
}

impl ShapeGuess {
    pub fn new() -> Self {
        Self {
            phase: ShapePhase::Thinking,
            correct: [Shape::Circle, Shape::Triangle],
        }
    }

    pub fn correct(&self) -> [Shape; 2] {
        self.correct
    }

    fn resolve(&mut self, ctx: &mut RoundContext) {
        self.phase = ShapePhase::Resolved;
        let mut eliminated = Vec::new();
        for id in ctx.active_ids() {
            let guess = ctx
                .player(id)
                .and_then(|p| p.round_state.shape())
                .and_then(|card| card.guess);
            let survives = guess.is_some_and(|g| self.correct.contains(&g));
            if !survives {
                let reason = if guess.is_some() { "wrong shape" } else { "no guess" };
                if ctx.eliminate(id, reason) {
                    eliminated.push(ctx.handle_of(id));
                }
            }
        }
        info!(
            round = ctx.round_no(),
            correct = ?self.correct,
            eliminated = eliminated.len(),
            "Shape guess resolved"
        );
        let mut text = format!(
            "🔺 The safe shapes were {} and {}.",
            self.correct[0].label(),
            self.correct[1].label()
        );
        if eliminated.is_empty() {
            text.push_str("\nEveryone chose wisely.");
        } else {
            text.push_str(&format!("\nEliminated: {}", eliminated.join(", ")));
        }
        ctx.say(text);
        ctx.complete(RoundOutcome::Completed);
    }
}

impl Default for ShapeGuess {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for ShapeGuess {
    fn kind(&self) -> RoundKind {
        RoundKind::ShapeGuess
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            ShapePhase::Thinking => "thinking",
            ShapePhase::Guessing => "guessing",
            ShapePhase::Resolved => "resolved",
        }
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        self.correct = pick_correct(ctx.rng());
        self.phase = ShapePhase::Thinking;
        let thinking = ctx.timings().shape.thinking;
        ctx.show(
            Asset::ShapeBoard,
            format!(
                "🔺 Round {}: {}\nTwo of these three shapes are safe. You get one pick.\n\
                 Think it over: guessing opens in {}s.",
                ctx.round_no(),
                RoundKind::ShapeGuess.title(),
                thinking.as_secs()
            ),
        );
        ctx.schedule_in(thinking);
    }

    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        let PlayerAction::Guess(shape) = action else {
            return Err(foreign_action(self.kind(), action));
        };
        let now = ctx.now();
        let cooldown = ctx.timings().shape.action_cooldown;
        let phase = self.phase;

        let card = ctx.require_active(actor)?.round_state.shape_mut();
        if card
            .last_action
            .is_some_and(|last| now.saturating_sub(last) < cooldown)
        {
            return Err(DomainError::validation(
                ValidationKind::Cooldown,
                "Slow down.",
            ));
        }

        match phase {
            ShapePhase::Thinking => Err(wrong_phase("Guessing has not opened yet.")),
            ShapePhase::Resolved => Err(wrong_phase("Guessing is closed.")),
            ShapePhase::Guessing => {
                if let Some(existing) = card.guess {
                    return Err(DomainError::validation(
                        ValidationKind::AlreadyActed,
                        format!("You already picked {}.", existing.label()),
                    ));
                }
                card.guess = Some(*shape);
                card.last_action = Some(now);
                ctx.tell(actor, format!("You picked {}. Good luck.", shape.label()));
                Ok(())
            }
        }
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            ShapePhase::Thinking => {
                self.phase = ShapePhase::Guessing;
                let guessing = ctx.timings().shape.guessing;
                ctx.prompt(
                    format!("Pick your shape! You have {}s.", guessing.as_secs()),
                    &["circle", "triangle", "square"],
                );
                ctx.schedule_in(guessing);
            }
            ShapePhase::Guessing => self.resolve(ctx),
            ShapePhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        if self.phase != ShapePhase::Resolved {
            self.resolve(ctx);
        }
    }
}
