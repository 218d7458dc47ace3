//! Tournament scheduler: round order and terminal conditions.
//!
//! Round 1 is always the movement race. Later rounds draw a category without
//! replacement (refilling once every category has been used), then a kind
//! uniformly from that category's pool. A vote that leaves two players forces
//! a quiz duel next, even past the round budget.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::domain::player::PlayerId;
use crate::domain::roster::Roster;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{RoundCategory, RoundKind, RoundOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRound {
    pub at: Duration,
    pub round_no: u8,
    pub kind: RoundKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finale {
    NoSurvivors,
    Champion(PlayerId),
    /// Round budget spent; everyone still alive shares the win.
    Survivors(Vec<PlayerId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Next(PendingRound),
    Finished(Finale),
}

pub struct Scheduler {
    rng: ChaCha8Rng,
    max_rounds: u8,
    rounds_started: u8,
    remaining: Vec<RoundCategory>,
    forced_next: Option<RoundKind>,
    pending: Option<PendingRound>,
    active: bool,
}

impl Scheduler {
    pub fn new(seed: u64, max_rounds: u8) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_rounds: max_rounds.max(1),
            rounds_started: 0,
            remaining: RoundCategory::DRAWN.to_vec(),
            forced_next: None,
            pending: None,
            active: false,
        }
    }

    /// Start a tournament: round 1 after `preparation`.
    pub fn begin(
        &mut self,
        roster: &Roster,
        now: Duration,
        preparation: Duration,
    ) -> Result<PendingRound, DomainError> {
        if roster.alive_count() == 0 {
            return Err(DomainError::validation(
                ValidationKind::EmptyRoster,
                "There are no players to start a tournament with.",
            ));
        }
        self.rounds_started = 0;
        self.remaining = RoundCategory::DRAWN.to_vec();
        self.forced_next = None;
        self.active = true;
        let first = PendingRound {
            at: now + preparation,
            round_no: 1,
            kind: RoundKind::MovementRace,
        };
        self.pending = Some(first);
        info!(alive = roster.alive_count(), "Tournament scheduled");
        Ok(first)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rounds_started(&self) -> u8 {
        self.rounds_started
    }

    pub fn max_rounds(&self) -> u8 {
        self.max_rounds
    }

    pub fn pending(&self) -> Option<PendingRound> {
        self.pending
    }

    /// Hand out the pending round once its start time has come.
    pub fn take_due(&mut self, now: Duration) -> Option<PendingRound> {
        match self.pending {
            Some(p) if p.at <= now => {
                self.pending = None;
                self.rounds_started = p.round_no;
                Some(p)
            }
            _ => None,
        }
    }

    /// Start the pending round right away.
    pub fn take_now(&mut self) -> Option<PendingRound> {
        let p = self.pending.take()?;
        self.rounds_started = p.round_no;
        Some(p)
    }

    pub fn after_round(
        &mut self,
        roster: &Roster,
        outcome: RoundOutcome,
        now: Duration,
        cooldown: Duration,
    ) -> Decision {
        if let RoundOutcome::Champion(id) = outcome {
            return self.finish(Finale::Champion(id));
        }
        let alive: Vec<PlayerId> = roster.alive().map(|p| p.id).collect();
        match alive.as_slice() {
            [] => return self.finish(Finale::NoSurvivors),
            [only] => return self.finish(Finale::Champion(*only)),
            _ => {}
        }

        if outcome == RoundOutcome::FinalDuel {
            self.forced_next = Some(RoundKind::QuizRace);
        }
        let kind = match self.forced_next.take() {
            Some(kind) => kind,
            None if self.rounds_started >= self.max_rounds => {
                return self.finish(Finale::Survivors(alive));
            }
            None => self.draw_kind(),
        };

        let next = PendingRound {
            at: now + cooldown,
            round_no: self.rounds_started.saturating_add(1),
            kind,
        };
        self.pending = Some(next);
        debug!(round = next.round_no, ?kind, "Next round scheduled");
        Decision::Next(next)
    }

    /// Stop scheduling. Returns `false` if nothing was running.
    pub fn abort(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.pending = None;
        self.forced_next = None;
        true
    }

    fn finish(&mut self, finale: Finale) -> Decision {
        self.active = false;
        self.pending = None;
        self.forced_next = None;
        info!(?finale, rounds = self.rounds_started, "Tournament finished");
        Decision::Finished(finale)
    }

    fn draw_kind(&mut self) -> RoundKind {
        if self.remaining.is_empty() {
            self.remaining = RoundCategory::DRAWN.to_vec();
        }
        let idx = self.rng.random_range(0..self.remaining.len());
        let category = self.remaining.swap_remove(idx);
        category
            .pool()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(RoundKind::ShapeGuess)
    }
}
