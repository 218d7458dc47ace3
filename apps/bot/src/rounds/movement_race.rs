//! Red light / green light.
//!
//! Phases: `waiting -> red <-> green`, flipping after a random interval until
//! the total duration runs out. The flip timer and the end of the race share
//! the round's single deadline: whichever comes first is armed.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::effects::{Asset, Effect};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Light {
    Waiting,
    Red,
    Green,
}

pub struct MovementRace {
    light: Light,
    ends_at: Option<Duration>,
}

impl MovementRace {
    pub fn new() -> Self {
        Self {
            light: Light::Waiting,
            ends_at: None,
        }
    }

    pub fn light(&self) -> Light {
        self.light
    }

    fn arm_next_flip(&mut self, ctx: &mut RoundContext) {
        let race = ctx.timings().race.clone();
        let flip_in = if race.flip_min >= race.flip_max {
            race.flip_min
        } else {
            let lo = race.flip_min.as_millis() as u64;
            let hi = race.flip_max.as_millis() as u64;
            Duration::from_millis(ctx.rng().random_range(lo..=hi))
        };
        let next_flip = ctx.now() + flip_in;
        match self.ends_at {
            Some(end) if end <= next_flip => ctx.schedule_at(end),
            _ => ctx.schedule_at(next_flip),
        }
    }

    fn turn_red(&mut self, ctx: &mut RoundContext) {
        self.light = Light::Red;
        let caught: Vec<PlayerId> = ctx
            .participants()
            .iter()
            .filter(|p| p.is_alive())
            .filter(|p| {
                p.round_state
                    .race()
                    .is_some_and(|lane| lane.is_running() && !lane.finished())
            })
            .map(|p| p.id)
            .collect();

        for id in ctx.active_ids() {
            if let Some(p) = ctx.player_mut(id) {
                p.round_state.race_mut().running_since = None;
            }
        }

        ctx.show(Asset::RedLight, "🔴 RED LIGHT! Freeze!");
        for id in caught {
            self.catch(ctx, id, "still running when the light turned red");
        }
    }

    fn turn_green(&mut self, ctx: &mut RoundContext) {
        self.light = Light::Green;
        for id in ctx.active_ids() {
            if let Some(p) = ctx.player_mut(id) {
                p.round_state.race_mut().running_since = None;
            }
        }
        ctx.show(Asset::GreenLight, "🟢 GREEN LIGHT! Move!");
        ctx.prompt("Press RUN to start moving and STOP before the light turns red.", &["RUN", "STOP"]);
    }

    fn catch(&mut self, ctx: &mut RoundContext, id: PlayerId, reason: &str) {
        if ctx.eliminate(id, reason) {
            let handle = ctx.handle_of(id);
            let chat = ctx.chat();
            ctx.emit(Effect::Restrict { chat, player: id });
            ctx.say(format!("💀 {handle} moved on red and is eliminated."));
        }
    }

    fn finish(&mut self, ctx: &mut RoundContext) {
        let eliminate_unfinished = ctx.timings().race.eliminate_unfinished;
        let mut finishers = Vec::new();
        let mut stragglers = Vec::new();
        for id in ctx.active_ids() {
            let Some(p) = ctx.player_mut(id) else { continue };
            let lane = p.round_state.race_mut();
            lane.running_since = None;
            if lane.finished() {
                finishers.push(id);
            } else {
                stragglers.push(id);
            }
        }

        if eliminate_unfinished {
            for id in &stragglers {
                ctx.eliminate(*id, "did not reach the finish line");
            }
        }

        info!(
            round = ctx.round_no(),
            finished = finishers.len(),
            unfinished = stragglers.len(),
            eliminate_unfinished,
            "Movement race over"
        );
        let mut summary = format!(
            "🏁 Time is up! {} player(s) reached the finish line.",
            finishers.len()
        );
        if eliminate_unfinished && !stragglers.is_empty() {
            let names: Vec<String> = stragglers.iter().map(|id| ctx.handle_of(*id)).collect();
            summary.push_str(&format!("\nEliminated: {}", names.join(", ")));
        }
        ctx.say(summary);
        ctx.complete(RoundOutcome::Completed);
    }

    #[cfg(test)]
    pub(crate) fn inject_light(&mut self, ctx: &mut RoundContext, light: Light) {
        match light {
            Light::Red => self.turn_red(ctx),
            Light::Green => self.turn_green(ctx),
            Light::Waiting => self.light = Light::Waiting,
        }
    }
}

impl Default for MovementRace {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress earned by running for `elapsed` when `full` covers the whole track.
pub fn progress_for(elapsed: Duration, full: Duration) -> u8 {
    let pct = elapsed.as_millis().saturating_mul(100) / full.as_millis().max(1);
    pct.min(100) as u8
}

impl RoundProtocol for MovementRace {
    fn kind(&self) -> RoundKind {
        RoundKind::MovementRace
    }

    fn phase(&self) -> &'static str {
        match self.light {
            Light::Waiting => "waiting",
            Light::Red => "red",
            Light::Green => "green",
        }
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let prep = ctx.timings().race.prep;
        let full = ctx.timings().race.full_progress;
        ctx.say(format!(
            "🚦 Round {}: {}\nRUN on green, STOP before red. Moving on red is fatal.\n\
             {}s of running carries you to the finish. Starting in {}s.",
            ctx.round_no(),
            RoundKind::MovementRace.title(),
            full.as_secs_f32(),
            prep.as_secs()
        ));
        ctx.schedule_in(prep);
    }

    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        if !matches!(action, PlayerAction::Run | PlayerAction::Stop) {
            return Err(foreign_action(self.kind(), action));
        }
        let now = ctx.now();
        let full = ctx.timings().race.full_progress;
        let lane = ctx.require_active(actor)?.round_state.race_mut().clone();

        if lane.finished() {
            return Err(DomainError::validation(
                ValidationKind::AlreadyFinished,
                "You already crossed the finish line. You are safe!",
            ));
        }

        match self.light {
            Light::Waiting => Err(wrong_phase("Wait for the game to start.")),
            Light::Red => {
                self.catch(ctx, actor, "moved during red light");
                Ok(())
            }
            Light::Green => match action {
                PlayerAction::Run => {
                    if lane.is_running() {
                        return Err(DomainError::validation(
                            ValidationKind::AlreadyActed,
                            "You are already running.",
                        ));
                    }
                    if let Some(p) = ctx.player_mut(actor) {
                        p.round_state.race_mut().running_since = Some(now);
                    }
                    debug!(player_id = actor, "Started running");
                    Ok(())
                }
                _ => {
                    let Some(since) = lane.running_since else {
                        return Err(DomainError::validation(
                            ValidationKind::NotRunning,
                            "You are not running.",
                        ));
                    };
                    let gained = progress_for(now.saturating_sub(since), full);
                    let progress = lane.progress.saturating_add(gained).min(100);
                    if let Some(p) = ctx.player_mut(actor) {
                        let slot = p.round_state.race_mut();
                        slot.running_since = None;
                        slot.progress = progress;
                    }
                    let handle = ctx.handle_of(actor);
                    if progress >= 100 {
                        ctx.say(format!("🎉 {handle} crossed the finish line!"));
                    } else {
                        ctx.tell(actor, format!("You stopped at {progress}% progress."));
                    }
                    debug!(player_id = actor, progress, "Stopped running");
                    Ok(())
                }
            },
        }
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        if self.light == Light::Waiting {
            self.ends_at = Some(ctx.now() + ctx.timings().race.duration);
            self.turn_red(ctx);
            self.arm_next_flip(ctx);
            return;
        }
        if self.ends_at.is_some_and(|end| ctx.now() >= end) {
            self.finish(ctx);
            return;
        }
        match self.light {
            Light::Red => self.turn_green(ctx),
            _ => self.turn_red(ctx),
        }
        self.arm_next_flip(ctx);
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        self.finish(ctx);
    }
}
