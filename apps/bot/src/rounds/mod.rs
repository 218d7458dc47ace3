//! Round protocols: one finite-state machine per mini-game.
//!
//! The coordinator drives every protocol through the same [`RoundProtocol`]
//! surface. A protocol never touches the canonical roster; it works on the
//! participant snapshot held by its [`RoundContext`] and finishes by calling
//! [`RoundContext::complete`] exactly once.

pub mod context;
pub mod flag_guess;
pub mod movement_race;
pub mod number_hunt;
pub mod partner_trust;
pub mod quiz_bank;
pub mod quiz_race;
pub mod shape_guess;
pub mod vote;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests_flag_guess;
#[cfg(test)]
mod tests_movement_race;
#[cfg(test)]
mod tests_partner_trust;
#[cfg(test)]
mod tests_props_rounds;
#[cfg(test)]
mod tests_quiz_race;
#[cfg(test)]
mod tests_shape_guess;
#[cfg(test)]
mod tests_vote;

use serde::{Deserialize, Serialize};

pub use context::RoundContext;

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    MovementRace,
    ShapeGuess,
    PartnerTrust,
    Vote,
    QuizRace,
    NumberHunt,
    FlagGuess,
}

impl RoundKind {
    pub fn title(self) -> &'static str {
        match self {
            RoundKind::MovementRace => "Red Light, Green Light",
            RoundKind::ShapeGuess => "Shape Guess",
            RoundKind::PartnerTrust => "Trust or Betray",
            RoundKind::Vote => "The Vote",
            RoundKind::QuizRace => "Quiz Race",
            RoundKind::NumberHunt => "Number Hunt",
            RoundKind::FlagGuess => "Guess the Flag",
        }
    }
}

/// Pools later rounds are drawn from. Round 1 is always `Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundCategory {
    Fixed,
    Skill,
    Luck,
    Betrayal,
    Final,
}

impl RoundCategory {
    pub const DRAWN: [RoundCategory; 4] = [
        RoundCategory::Skill,
        RoundCategory::Luck,
        RoundCategory::Betrayal,
        RoundCategory::Final,
    ];

    pub fn pool(self) -> &'static [RoundKind] {
        match self {
            RoundCategory::Fixed => &[RoundKind::MovementRace],
            RoundCategory::Skill => &[RoundKind::NumberHunt, RoundKind::FlagGuess],
            RoundCategory::Luck => &[RoundKind::ShapeGuess],
            RoundCategory::Betrayal => &[RoundKind::PartnerTrust],
            RoundCategory::Final => &[RoundKind::Vote, RoundKind::QuizRace],
        }
    }
}

/// How a round ended, as reported to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Eliminations applied; the scheduler decides what follows.
    Completed,
    /// Exactly two players survive a vote and should meet in a quiz duel.
    FinalDuel,
    /// The round crowned a sole winner.
    Champion(PlayerId),
}

pub trait RoundProtocol: Send {
    fn kind(&self) -> RoundKind;

    /// Current phase name, for status reports and logs.
    fn phase(&self) -> &'static str;

    /// Announce the round and arm the first phase deadline.
    fn start(&mut self, ctx: &mut RoundContext);

    /// Apply one player action. An `Err` leaves the round untouched.
    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError>;

    /// The armed deadline has been reached.
    fn on_deadline(&mut self, ctx: &mut RoundContext);

    /// Finish now with whatever input has been collected.
    fn force_resolve(&mut self, ctx: &mut RoundContext);

    /// Whether free chat text should be treated as an answer.
    fn accepts_free_text(&self) -> bool {
        false
    }

    /// Answers belong in the player's private chat rather than the channel.
    fn answers_in_private(&self) -> bool {
        false
    }

    /// Tear down before the round is discarded.
    fn cancel(&mut self, ctx: &mut RoundContext) {
        ctx.clear_deadline();
    }
}

pub fn build(kind: RoundKind) -> Box<dyn RoundProtocol> {
    match kind {
        RoundKind::MovementRace => Box::new(movement_race::MovementRace::new()),
        RoundKind::ShapeGuess => Box::new(shape_guess::ShapeGuess::new()),
        RoundKind::PartnerTrust => Box::new(partner_trust::PartnerTrust::new()),
        RoundKind::Vote => Box::new(vote::Vote::new()),
        RoundKind::QuizRace => Box::new(quiz_race::QuizRace::new()),
        RoundKind::NumberHunt => Box::new(number_hunt::NumberHunt::new()),
        RoundKind::FlagGuess => Box::new(flag_guess::FlagGuess::new()),
    }
}

/// Rejection for an action that belongs to a different round.
pub(crate) fn foreign_action(kind: RoundKind, action: &PlayerAction) -> DomainError {
    DomainError::validation(
        ValidationKind::NoActiveRound,
        format!("{} is not part of {}", action.name(), kind.title()),
    )
}

pub(crate) fn wrong_phase(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::WrongPhase, detail)
}
