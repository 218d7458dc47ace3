//! Per-round execution context owned by the coordinator.
//!
//! Holds the frozen participant snapshot (the round's working copy), the
//! round's RNG, its single pending deadline and the effects produced while
//! handling one event. Nothing in here outlives the round.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::Timings;
use crate::domain::player::{ChatId, Player, PlayerId, PlayerStatus};
use crate::effects::{Asset, Effect};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::RoundOutcome;

pub struct RoundContext {
    round_no: u8,
    chat: ChatId,
    timings: Timings,
    now: Duration,
    rng: ChaCha8Rng,
    players: Vec<Player>,
    deadline: Option<Duration>,
    effects: Vec<Effect>,
    outcome: Option<RoundOutcome>,
}

impl RoundContext {
    pub fn new(
        round_no: u8,
        chat: ChatId,
        timings: Timings,
        seed: u64,
        players: Vec<Player>,
        now: Duration,
    ) -> Self {
        Self {
            round_no,
            chat,
            timings,
            now,
            rng: ChaCha8Rng::seed_from_u64(seed),
            players,
            deadline: None,
            effects: Vec::new(),
            outcome: None,
        }
    }

    pub fn round_no(&self) -> u8 {
        self.round_no
    }

    pub fn chat(&self) -> ChatId {
        self.chat
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // --- deadline ------------------------------------------------------

    /// Arm the round's deadline `delay` from now, replacing any pending one.
    pub fn schedule_in(&mut self, delay: Duration) {
        self.deadline = Some(self.now + delay);
    }

    pub fn schedule_at(&mut self, at: Duration) {
        self.deadline = Some(at);
    }

    pub fn clear_deadline(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    // --- output --------------------------------------------------------

    pub fn say(&mut self, text: impl Into<String>) {
        self.effects.push(Effect::send(self.chat, text));
    }

    /// Private message; player ids double as their private chat ids.
    pub fn tell(&mut self, player: PlayerId, text: impl Into<String>) {
        self.effects.push(Effect::send(player, text));
    }

    pub fn prompt(&mut self, text: impl Into<String>, choices: &[&str]) {
        self.effects.push(Effect::Prompt {
            to: self.chat,
            text: text.into(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        });
    }

    pub fn show(&mut self, asset: Asset, caption: impl Into<String>) {
        self.effects.push(Effect::SendMedia {
            to: self.chat,
            asset,
            caption: caption.into(),
        });
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // --- participants --------------------------------------------------

    pub fn participants(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(Player::is_alive)
    }

    /// The actor as a still-alive participant of this round.
    pub fn require_active(&mut self, id: PlayerId) -> Result<&mut Player, DomainError> {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) if p.is_alive() => Ok(p),
            Some(_) => Err(DomainError::validation(
                ValidationKind::NotAlive,
                "You have been eliminated and cannot play anymore.",
            )),
            None => Err(DomainError::validation(
                ValidationKind::NotRegistered,
                "You are not part of this round.",
            )),
        }
    }

    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    /// Resolve `@name` to an active participant.
    pub fn resolve_target(&self, mention: &str) -> Result<PlayerId, DomainError> {
        match self.players.iter().find(|p| p.matches_mention(mention)) {
            Some(p) if p.is_alive() => Ok(p.id),
            Some(p) => Err(DomainError::validation(
                ValidationKind::TargetUnavailable,
                format!("{} is no longer in the game.", p.handle()),
            )),
            None => Err(DomainError::validation(
                ValidationKind::UnknownTarget,
                format!("No player called {} in this round.", mention.trim()),
            )),
        }
    }

    pub fn handle_of(&self, id: PlayerId) -> String {
        self.player(id)
            .map(Player::handle)
            .unwrap_or_else(|| format!("player {id}"))
    }

    /// Mark an active participant eliminated in the working copy.
    ///
    /// Returns `false` (and changes nothing) if the player was not active.
    pub fn eliminate(&mut self, id: PlayerId, reason: &str) -> bool {
        let round_no = self.round_no;
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if player.transition(PlayerStatus::Eliminated).is_err() {
            return false;
        }
        info!(round = round_no, player_id = id, reason, "Player eliminated");
        true
    }

    pub fn crown(&mut self, id: PlayerId) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        player.transition(PlayerStatus::Winner).is_ok()
    }

    // --- completion ----------------------------------------------------

    /// Signal completion. Only the first call counts; the deadline is cleared.
    pub fn complete(&mut self, outcome: RoundOutcome) {
        if let Some(existing) = self.outcome {
            warn!(
                round = self.round_no,
                ?existing,
                ignored = ?outcome,
                "Round completed twice; keeping first outcome"
            );
            return;
        }
        self.outcome = Some(outcome);
        self.deadline = None;
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub(crate) fn into_players(self) -> Vec<Player> {
        self.players
    }
}
