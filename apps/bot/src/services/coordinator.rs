//! Round coordinator: the single driver every round protocol runs under.
//!
//! Owns the in-flight round (protocol plus its [`RoundContext`]), feeds it
//! actions and deadlines, and hands the working copy back once the protocol
//! completes. After completion the round is dropped, so late actions for it
//! find no listener.

use std::time::Duration;

use tracing::{debug, info};

use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::{ChatId, Player, PlayerId};
use crate::effects::Effect;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::rounds::{self, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

/// Everything the scheduler needs from a finished round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round_no: u8,
    pub kind: RoundKind,
    pub outcome: RoundOutcome,
    pub players: Vec<Player>,
}

/// Effects from one event, plus the report if the round finished.
#[derive(Debug, Default)]
pub struct Step {
    pub effects: Vec<Effect>,
    pub finished: Option<RoundReport>,
}

struct ActiveRound {
    protocol: Box<dyn RoundProtocol>,
    ctx: RoundContext,
}

#[derive(Default)]
pub struct Coordinator {
    active: Option<ActiveRound>,
}

/// Parameters for starting a round.
pub struct RoundSpec {
    pub kind: RoundKind,
    pub round_no: u8,
    pub chat: ChatId,
    pub timings: Timings,
    pub seed: u64,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn kind(&self) -> Option<RoundKind> {
        self.active.as_ref().map(|r| r.protocol.kind())
    }

    pub fn phase(&self) -> Option<&'static str> {
        self.active.as_ref().map(|r| r.protocol.phase())
    }

    pub fn round_no(&self) -> Option<u8> {
        self.active.as_ref().map(|r| r.ctx.round_no())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.active.as_ref().and_then(|r| r.ctx.deadline())
    }

    pub fn participant(&self, id: PlayerId) -> Option<&Player> {
        self.active.as_ref().and_then(|r| r.ctx.player(id))
    }

    /// Whether free chat from `actor` should be treated as an answer right now.
    ///
    /// Only text from the chat the round collects answers in counts.
    pub fn wants_free_text_from(&self, actor: PlayerId, private: bool) -> bool {
        self.active.as_ref().is_some_and(|r| {
            r.protocol.accepts_free_text()
                && r.protocol.answers_in_private() == private
                && r.ctx.is_active(actor)
        })
    }

    pub fn answers_in_private(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|r| r.protocol.answers_in_private())
    }

    /// Start `spec.kind` over a frozen snapshot of the alive players.
    pub fn start(
        &mut self,
        spec: RoundSpec,
        snapshot: Vec<Player>,
        now: Duration,
    ) -> Result<Step, DomainError> {
        if let Some(existing) = &self.active {
            return Err(DomainError::conflict(
                ConflictKind::RoundInFlight,
                format!(
                    "round {} ({:?}) is still running",
                    existing.ctx.round_no(),
                    existing.protocol.kind()
                ),
            ));
        }
        info!(
            round = spec.round_no,
            kind = ?spec.kind,
            participants = snapshot.len(),
            "Round starting"
        );
        let mut ctx = RoundContext::new(
            spec.round_no,
            spec.chat,
            spec.timings,
            spec.seed,
            snapshot,
            now,
        );
        let mut protocol = rounds::build(spec.kind);
        protocol.start(&mut ctx);
        self.active = Some(ActiveRound { protocol, ctx });
        Ok(self.drain())
    }

    pub fn on_action(
        &mut self,
        actor: PlayerId,
        action: &PlayerAction,
        now: Duration,
    ) -> Result<Step, DomainError> {
        let Some(round) = self.active.as_mut() else {
            return Err(DomainError::validation(
                ValidationKind::NoActiveRound,
                "No round is running.",
            ));
        };
        round.ctx.set_now(now);
        if let Err(e) = round.protocol.on_action(&mut round.ctx, actor, action) {
            // rejected actions leave no output behind
            round.ctx.take_effects();
            return Err(e);
        }
        Ok(self.drain())
    }

    /// Fire the round's deadline if it is due.
    pub fn on_deadline(&mut self, now: Duration) -> Step {
        let Some(round) = self.active.as_mut() else {
            return Step::default();
        };
        match round.ctx.deadline() {
            Some(at) if at <= now => {}
            _ => return Step::default(),
        }
        round.ctx.set_now(now);
        round.ctx.clear_deadline();
        debug!(
            round = round.ctx.round_no(),
            phase = round.protocol.phase(),
            "Round deadline reached"
        );
        round.protocol.on_deadline(&mut round.ctx);
        self.drain()
    }

    pub fn force_resolve(&mut self, now: Duration) -> Result<Step, DomainError> {
        let Some(round) = self.active.as_mut() else {
            return Err(DomainError::validation(
                ValidationKind::NoActiveRound,
                "No round is running.",
            ));
        };
        round.ctx.set_now(now);
        info!(
            round = round.ctx.round_no(),
            phase = round.protocol.phase(),
            "Round force-resolved"
        );
        round.protocol.force_resolve(&mut round.ctx);
        Ok(self.drain())
    }

    /// Discard the in-flight round without reporting its working copy.
    pub fn cancel(&mut self, now: Duration) -> Vec<Effect> {
        let Some(mut round) = self.active.take() else {
            return Vec::new();
        };
        round.ctx.set_now(now);
        round.protocol.cancel(&mut round.ctx);
        info!(
            round = round.ctx.round_no(),
            phase = round.protocol.phase(),
            "Round cancelled"
        );
        round.ctx.take_effects()
    }

    fn drain(&mut self) -> Step {
        let Some(round) = self.active.as_mut() else {
            return Step::default();
        };
        let effects = round.ctx.take_effects();
        let Some(outcome) = round.ctx.outcome() else {
            return Step {
                effects,
                finished: None,
            };
        };
        let finished = self.active.take().map(|round| {
            let round_no = round.ctx.round_no();
            let kind = round.protocol.kind();
            info!(round = round_no, ?kind, ?outcome, "Round completed");
            RoundReport {
                round_no,
                kind,
                outcome,
                players: round.ctx.into_players(),
            }
        });
        Step { effects, finished }
    }
}
