//! Number hunt: find a private secret with a limited number of guesses.
//!
//! After `prep`, every participant gets their own secret in a private chat.
//! Each guess is answered with higher/lower. Solving marks the player safe,
//! running out of guesses eliminates, and the deadline eliminates whoever is
//! still searching. The round ends early once nobody is left searching.

use std::cmp::Ordering;

use rand::Rng;
use tracing::{debug, info};

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::domain::round_state::HuntCard;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntPhase {
    Prep,
    Hunting,
    Resolved,
}

pub struct NumberHunt {
    phase: HuntPhase,
}

impl NumberHunt {
    pub fn new() -> Self {
        Self {
            phase: HuntPhase::Prep,
        }
    }

    fn deal_secrets(&mut self, ctx: &mut RoundContext) {
        self.phase = HuntPhase::Hunting;
        let hunt = ctx.timings().hunt.clone();
        for id in ctx.active_ids() {
            let secret = ctx.rng().random_range(1..=hunt.max_secret);
            if let Some(p) = ctx.player_mut(id) {
                *p.round_state.hunt_mut() = HuntCard {
                    secret,
                    guesses_left: hunt.guesses,
                    solved: false,
                };
            }
            ctx.tell(
                id,
                format!(
                    "🔢 I am thinking of a number between 1 and {}. You have {} guesses \
                     and {}s. Send your guesses here.",
                    hunt.max_secret,
                    hunt.guesses,
                    hunt.limit.as_secs()
                ),
            );
        }
        ctx.say(format!(
            "The hunt is on! Check your private chat. {}s on the clock.",
            hunt.limit.as_secs()
        ));
        ctx.schedule_in(hunt.limit);
    }

    fn searching(ctx: &RoundContext) -> Vec<PlayerId> {
        ctx.participants()
            .iter()
            .filter(|p| p.is_alive())
            .filter(|p| !p.round_state.hunt().is_some_and(|c| c.solved))
            .map(|p| p.id)
            .collect()
    }

    fn resolve(&mut self, ctx: &mut RoundContext) {
        self.phase = HuntPhase::Resolved;
        let mut names = Vec::new();
        for id in Self::searching(ctx) {
            if ctx.eliminate(id, "number not found in time") {
                names.push(ctx.handle_of(id));
            }
        }
        info!(round = ctx.round_no(), eliminated = names.len(), "Number hunt over");
        if names.is_empty() {
            ctx.say("🔢 The hunt is over. Everyone found their number.");
        } else {
            ctx.say(format!(
                "🔢 The hunt is over. Eliminated: {}",
                names.join(", ")
            ));
        }
        ctx.complete(RoundOutcome::Completed);
    }
}

impl Default for NumberHunt {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for NumberHunt {
    fn kind(&self) -> RoundKind {
        RoundKind::NumberHunt
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            HuntPhase::Prep => "prep",
            HuntPhase::Hunting => "hunting",
            HuntPhase::Resolved => "resolved",
        }
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let prep = ctx.timings().hunt.prep;
        ctx.show(
            Asset::HuntIntro,
            format!(
                "🔢 Round {}: {}\nEach of you gets a secret number in private. Find it before \
                 your guesses or the clock run out. Starting in {}s.",
                ctx.round_no(),
                RoundKind::NumberHunt.title(),
                prep.as_secs()
            ),
        );
        ctx.schedule_in(prep);
    }

    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        let PlayerAction::Number(guess) = action else {
            return Err(foreign_action(self.kind(), action));
        };
        if self.phase != HuntPhase::Hunting {
            return Err(wrong_phase("The hunt has not started."));
        }
        let max = ctx.timings().hunt.max_secret;
        let card = ctx.require_active(actor)?.round_state.hunt_mut();
        if card.solved {
            return Err(DomainError::validation(
                ValidationKind::AlreadyFinished,
                "You already found your number. You are safe!",
            ));
        }
        if *guess < 1 || *guess > max {
            return Err(DomainError::validation(
                ValidationKind::Malformed,
                format!("Guess a number between 1 and {max}."),
            ));
        }
        card.guesses_left = card.guesses_left.saturating_sub(1);
        let left = card.guesses_left;
        let secret = card.secret;
        let verdict = guess.cmp(&secret);
        if verdict == Ordering::Equal {
            card.solved = true;
        }
        debug!(player_id = actor, guess, left, "Hunt guess");

        match verdict {
            Ordering::Equal => {
                let handle = ctx.handle_of(actor);
                ctx.tell(actor, "🎯 Correct! You are safe.");
                ctx.say(format!("🎯 {handle} found their number."));
            }
            _ if left == 0 => {
                ctx.eliminate(actor, "out of guesses");
                let handle = ctx.handle_of(actor);
                ctx.tell(actor, format!("No guesses left. The number was {secret}."));
                ctx.say(format!("💀 {handle} ran out of guesses."));
            }
            Ordering::Less => ctx.tell(actor, format!("Higher! {left} guess(es) left.")),
            Ordering::Greater => ctx.tell(actor, format!("Lower! {left} guess(es) left.")),
        }

        if Self::searching(ctx).is_empty() {
            self.resolve(ctx);
        }
        Ok(())
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            HuntPhase::Prep => self.deal_secrets(ctx),
            HuntPhase::Hunting => self.resolve(ctx),
            HuntPhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            HuntPhase::Prep => {
                self.phase = HuntPhase::Resolved;
                ctx.complete(RoundOutcome::Completed);
            }
            HuntPhase::Hunting => self.resolve(ctx),
            HuntPhase::Resolved => {}
        }
    }
}
