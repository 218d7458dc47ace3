//! Guess the flag: name the country, privately, with a single try.
//!
//! Each flag stays up for the answer window. Every participant may send one
//! answer in their private chat; a second answer is refused. When the window
//! closes, a wrong or missing answer eliminates. The round shows
//! `flag.rounds` flags in a row, stopping early when nobody is left.

use rand::Rng;
use tracing::{debug, info};

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::quiz_race::normalize_answer;
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

/// Country name and flag image.
pub const FLAGS: &[(&str, &str)] = &[
    ("Philippines", "flags/philippines.png"),
    ("Japan", "flags/japan.png"),
    ("France", "flags/france.png"),
    ("Germany", "flags/germany.png"),
    ("Brazil", "flags/brazil.png"),
    ("Canada", "flags/canada.png"),
    ("Italy", "flags/italy.png"),
    ("Australia", "flags/australia.png"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPhase {
    Prep,
    Showing,
    Between,
    Resolved,
}

pub struct FlagGuess {
    phase: FlagPhase,
    flag_no: u8,
    remaining: Vec<usize>,
    current: Option<usize>,
}

impl FlagGuess {
    pub fn new() -> Self {
        Self {
            phase: FlagPhase::Prep,
            flag_no: 0,
            remaining: (0..FLAGS.len()).collect(),
            current: None,
        }
    }

    pub fn flag_no(&self) -> u8 {
        self.flag_no
    }

    pub fn current_country(&self) -> Option<&'static str> {
        self.current.map(|i| FLAGS[i].0)
    }

    fn show_flag(&mut self, ctx: &mut RoundContext) {
        if self.remaining.is_empty() {
            self.finish(ctx);
            return;
        }
        let pick = ctx.rng().random_range(0..self.remaining.len());
        let idx = self.remaining.swap_remove(pick);
        self.current = Some(idx);
        self.flag_no += 1;
        self.phase = FlagPhase::Showing;
        for id in ctx.active_ids() {
            if let Some(p) = ctx.player_mut(id) {
                p.round_state.flag_mut().answer = None;
            }
        }
        let flag = ctx.timings().flag.clone();
        ctx.show(
            Asset::Flag(FLAGS[idx].1),
            format!(
                "🏳️ Flag {} of {}: which country is this?\nSend your answer to me in private. \
                 One try only, a typo is out! {}s on the clock.",
                self.flag_no,
                flag.rounds,
                flag.answer.as_secs()
            ),
        );
        ctx.schedule_in(flag.answer);
    }

    fn judge(&mut self, ctx: &mut RoundContext, last: bool) {
        let country = self.current_country().unwrap_or_default();
        let expected = normalize_answer(country);
        let mut survivors = Vec::new();
        let mut fallen = Vec::new();
        for id in ctx.active_ids() {
            let correct = ctx
                .player(id)
                .and_then(|p| p.round_state.flag())
                .and_then(|c| c.answer.as_deref())
                .is_some_and(|a| normalize_answer(a) == expected);
            if correct {
                survivors.push(ctx.handle_of(id));
            } else if ctx.eliminate(id, "wrong or missing flag answer") {
                fallen.push(ctx.handle_of(id));
            }
        }
        info!(
            round = ctx.round_no(),
            flag = self.flag_no,
            survivors = survivors.len(),
            eliminated = fallen.len(),
            "Flag judged"
        );
        let list = |names: &[String]| {
            if names.is_empty() {
                "None".to_string()
            } else {
                names.join(", ")
            }
        };
        ctx.say(format!(
            "🏁 Flag {} is done! The answer was {country}.\n✅ Survivors: {}\n❌ Eliminated: {}",
            self.flag_no,
            list(&survivors),
            list(&fallen)
        ));

        if last || survivors.is_empty() || self.flag_no >= ctx.timings().flag.rounds {
            self.finish(ctx);
            return;
        }
        self.phase = FlagPhase::Between;
        let gap = ctx.timings().flag.gap;
        ctx.say(format!("⚔️ The next flag comes up in {}s. Get ready!", gap.as_secs()));
        ctx.schedule_in(gap);
    }

    fn finish(&mut self, ctx: &mut RoundContext) {
        self.phase = FlagPhase::Resolved;
        ctx.complete(RoundOutcome::Completed);
    }
}

impl Default for FlagGuess {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for FlagGuess {
    fn kind(&self) -> RoundKind {
        RoundKind::FlagGuess
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            FlagPhase::Prep => "prep",
            FlagPhase::Showing => "showing",
            FlagPhase::Between => "between",
            FlagPhase::Resolved => "resolved",
        }
    }

    fn accepts_free_text(&self) -> bool {
        self.phase == FlagPhase::Showing
    }

    fn answers_in_private(&self) -> bool {
        true
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let flag = ctx.timings().flag.clone();
        ctx.show(
            Asset::FlagIntro,
            format!(
                "🌍 Round {}: {}\nA flag will appear here. Send the country name to me in \
                 private within {}s. You get ONE try per flag; a wrong or missing answer is \
                 out.\n{} flag(s) in total. The first one comes up in {}s.",
                ctx.round_no(),
                RoundKind::FlagGuess.title(),
                flag.answer.as_secs(),
                flag.rounds,
                flag.prep.as_secs()
            ),
        );
        ctx.schedule_in(flag.prep);
    }

    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        let PlayerAction::Answer(text) = action else {
            return Err(foreign_action(self.kind(), action));
        };
        if self.phase != FlagPhase::Showing {
            return Err(wrong_phase("No flag is up right now."));
        }
        let card = ctx.require_active(actor)?.round_state.flag_mut();
        if let Some(previous) = &card.answer {
            return Err(DomainError::validation(
                ValidationKind::AlreadyActed,
                format!("You already answered \"{previous}\" for this flag. Wait for the results."),
            ));
        }
        card.answer = Some(text.trim().to_string());
        debug!(player_id = actor, flag = self.flag_no, "Flag answer recorded");
        ctx.tell(actor, format!("Got it: \"{}\". Results when the time is up.", text.trim()));
        Ok(())
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            FlagPhase::Prep | FlagPhase::Between => self.show_flag(ctx),
            FlagPhase::Showing => self.judge(ctx, false),
            FlagPhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            FlagPhase::Showing => self.judge(ctx, true),
            FlagPhase::Prep | FlagPhase::Between => self.finish(ctx),
            FlagPhase::Resolved => {}
        }
    }
}
