//! Quiz race: first correct answer scores.
//!
//! Questions are drawn without replacement. While a question is open the
//! first correct answer sets the `answered` flag; everything after that is
//! ignored. The first player to reach the win score takes the tournament.

use rand::Rng;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::quiz_bank::QUESTIONS;
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Asking,
    Cooldown,
    Resolved,
}

pub struct QuizRace {
    phase: QuizPhase,
    bank: Vec<(String, String)>,
    remaining: Vec<usize>,
    current: Option<usize>,
    answered: bool,
}

/// Trim, NFKC-normalize, lowercase and collapse inner whitespace.
pub fn normalize_answer(raw: &str) -> String {
    raw.nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl QuizRace {
    pub fn new() -> Self {
        Self::with_bank(
            QUESTIONS
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
        )
    }

    pub fn with_bank(bank: Vec<(String, String)>) -> Self {
        Self {
            phase: QuizPhase::Cooldown,
            remaining: (0..bank.len()).collect(),
            bank,
            current: None,
            answered: false,
        }
    }

    pub fn answered(&self) -> bool {
        self.answered
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.current.map(|i| self.bank[i].1.as_str())
    }

    fn ask_next(&mut self, ctx: &mut RoundContext) {
        if self.remaining.is_empty() {
            self.exhausted(ctx);
            return;
        }
        let pick = ctx.rng().random_range(0..self.remaining.len());
        let idx = self.remaining.swap_remove(pick);
        self.current = Some(idx);
        self.answered = false;
        self.phase = QuizPhase::Asking;
        let window = ctx.timings().quiz.answer;
        let question = self.bank[idx].0.clone();
        ctx.say(format!("❓ {question}\nYou have {}s.", window.as_secs()));
        ctx.schedule_in(window);
    }

    fn crown(&mut self, ctx: &mut RoundContext, winner: PlayerId) {
        self.phase = QuizPhase::Resolved;
        for id in ctx.active_ids() {
            if id != winner {
                ctx.eliminate(id, "lost the quiz race");
            }
        }
        ctx.crown(winner);
        let handle = ctx.handle_of(winner);
        info!(round = ctx.round_no(), winner, "Quiz race won");
        ctx.show(Asset::Champion, format!("🏆 {handle} wins the quiz race!"));
        ctx.complete(RoundOutcome::Champion(winner));
    }

    fn exhausted(&mut self, ctx: &mut RoundContext) {
        self.phase = QuizPhase::Resolved;
        let mut names = Vec::new();
        for id in ctx.active_ids() {
            if ctx.eliminate(id, "quiz questions ran out") {
                names.push(ctx.handle_of(id));
            }
        }
        info!(round = ctx.round_no(), eliminated = names.len(), "Quiz pool exhausted");
        ctx.say(format!(
            "The questions ran out with no winner. Eliminated: {}",
            names.join(", ")
        ));
        ctx.complete(RoundOutcome::Completed);
    }

    fn scoreboard(ctx: &RoundContext) -> String {
        ctx.participants()
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| {
                let score = p.round_state.quiz().map_or(0, |q| q.score);
                format!("{} {score}", p.handle())
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for QuizRace {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for QuizRace {
    fn kind(&self) -> RoundKind {
        RoundKind::QuizRace
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            QuizPhase::Asking => "asking",
            QuizPhase::Cooldown => "cooldown",
            QuizPhase::Resolved => "resolved",
        }
    }

    fn accepts_free_text(&self) -> bool {
        self.phase == QuizPhase::Asking && !self.answered
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let win = ctx.timings().quiz.win_score;
        ctx.show(
            Asset::QuizIntro,
            format!(
                "🧠 Round {}: {}\nAnswer in the chat. The first correct answer scores.\n\
                 First to {win} point(s) wins everything.",
                ctx.round_no(),
                RoundKind::QuizRace.title()
            ),
        );
        self.ask_next(ctx);
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
        if self.answered {
            return Err(DomainError::validation(
                ValidationKind::AlreadyAnswered,
                "This question has already been answered.",
            ));
        }
        if self.phase != QuizPhase::Asking {
            return Err(wrong_phase("Wait for the next question."));
        }
        let win = ctx.timings().quiz.win_score;
        ctx.require_active(actor)?;

        let expected = self.current_answer().map(normalize_answer).unwrap_or_default();
        if normalize_answer(text) != expected {
            return Err(DomainError::validation(
                ValidationKind::WrongAnswer,
                "Wrong answer! Keep trying!",
            ));
        }

        self.answered = true;
        let score = match ctx.player_mut(actor) {
            Some(p) => {
                let card = p.round_state.quiz_mut();
                card.score += 1;
                card.score
            }
            None => 0,
        };
        let handle = ctx.handle_of(actor);
        info!(round = ctx.round_no(), player_id = actor, score, "Quiz point scored");

        if score >= win {
            self.crown(ctx, actor);
            return Ok(());
        }
        let board = Self::scoreboard(ctx);
        let cooldown = ctx.timings().quiz.cooldown;
        ctx.say(format!(
            "✅ {handle} got it! Scores: {board}\nNext question in {}s.",
            cooldown.as_secs()
        ));
        self.phase = QuizPhase::Cooldown;
        ctx.schedule_in(cooldown);
        Ok(())
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            QuizPhase::Asking => {
                let answer = self.current_answer().unwrap_or_default().to_string();
                let cooldown = ctx.timings().quiz.cooldown;
                ctx.say(format!(
                    "⏰ Time is up! The answer was: {answer}\nNext question in {}s.",
                    cooldown.as_secs()
                ));
                self.phase = QuizPhase::Cooldown;
                ctx.schedule_in(cooldown);
            }
            QuizPhase::Cooldown => self.ask_next(ctx),
            QuizPhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        if self.phase == QuizPhase::Resolved {
            return;
        }
        self.phase = QuizPhase::Resolved;
        ctx.say("The quiz was stopped. No winner this time.");
        ctx.complete(RoundOutcome::Completed);
    }
}
