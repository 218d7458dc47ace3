//! Tournament engine: the synchronous core of the bot.
//!
//! Every inbound event is handled to completion by [`TournamentEngine::handle`]
//! and turned into a list of [`Effect`]s; the async runtime performs them.
//! Time is passed in as a monotonic offset, so the whole game can be driven
//! deterministically from tests.

mod lifecycle;
mod operator;
mod player_actions;

use std::time::Duration;

use tracing::debug;

use crate::commands::{self, Command, Inbound};
use crate::config::GameConfig;
use crate::domain::player::{ChatId, Player};
use crate::domain::rate_limit::{RateLimiter, Verdict};
use crate::domain::roster::Roster;
use crate::effects::Effect;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::services::coordinator::Coordinator;
use crate::services::registration::Registration;
use crate::services::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Message(Inbound),
    /// Result of the `LoadRoster` effect.
    RosterLoaded(Result<Vec<Player>, DomainError>),
    /// A deadline may have been reached.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Registering { chat: ChatId },
    Loading { chat: ChatId },
    Running { chat: ChatId },
}

pub struct TournamentEngine {
    config: GameConfig,
    stage: Stage,
    roster: Roster,
    registration: Registration,
    scheduler: Scheduler,
    coordinator: Coordinator,
    limiter: RateLimiter,
    tournament_no: u32,
}

impl TournamentEngine {
    pub fn new(config: GameConfig) -> Self {
        let limiter = RateLimiter::new(&config.timings.spam);
        let scheduler = Scheduler::new(config.seed, config.timings.max_rounds);
        Self {
            config,
            stage: Stage::Idle,
            roster: Roster::new(),
            registration: Registration::new(),
            scheduler,
            coordinator: Coordinator::new(),
            limiter,
            tournament_no: 0,
        }
    }

    /// Adopt a stored roster at process start.
    pub fn restore(&mut self, players: Vec<Player>) -> Result<(), DomainError> {
        if self.stage != Stage::Idle {
            return Err(DomainError::validation(
                ValidationKind::TournamentRunning,
                "cannot restore a roster while a tournament is in progress",
            ));
        }
        self.roster = Roster::from_records(players)?;
        Ok(())
    }

    pub fn handle(&mut self, input: Input, now: Duration) -> Vec<Effect> {
        let mut out = Vec::new();
        match input {
            Input::Message(msg) => self.on_message(&msg, now, &mut out),
            Input::RosterLoaded(loaded) => self.on_roster_loaded(loaded, now, &mut out),
            Input::Tick => self.on_tick(now, &mut out),
        }
        out
    }

    /// The earliest pending deadline across registration, scheduler and round.
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.registration.closes_at(),
            self.scheduler.pending().map(|p| p.at),
            self.coordinator.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn operator_id(&self) -> i64 {
        self.config.operator_id
    }

    fn channel(&self) -> Option<ChatId> {
        match self.stage {
            Stage::Idle => None,
            Stage::Registering { chat } | Stage::Loading { chat } | Stage::Running { chat } => {
                Some(chat)
            }
        }
    }

    fn on_message(&mut self, msg: &Inbound, now: Duration, out: &mut Vec<Effect>) {
        let Some(command) = commands::parse(&msg.text, msg.private) else {
            return;
        };
        if command.is_operator_only() && msg.sender.id != self.config.operator_id {
            let err = DomainError::validation(
                ValidationKind::Unauthorized,
                "Only the host can do that.",
            );
            self.reject(msg, err, now, out);
            return;
        }

        let result = match command {
            Command::Start(slots) => self.open_registration(msg, slots, now, out),
            Command::Join => self.join(msg, out),
            Command::Begin => self.begin(msg, out),
            Command::StopGame => self.stop_game(now, out),
            Command::StopRound => self.stop_round(now, out),
            Command::Roster => self.list_roster(msg, out),
            Command::Status => self.report_status(msg, now, out),
            Command::Reset => self.reset(msg, now, out),
            Command::Action(action) => self.player_action(msg, action, now, out),
            Command::Chatter(text) => self.chatter(msg, text, now, out),
        };
        if let Err(err) = result {
            self.reject(msg, err, now, out);
        }
    }

    /// Answer a rejected input, unless it is silent or the sender is spamming.
    fn reject(&mut self, msg: &Inbound, err: DomainError, now: Duration, out: &mut Vec<Effect>) {
        if err.is_silent() {
            debug!(player_id = msg.sender.id, error = %err, "Ignored input");
            return;
        }
        match self.limiter.hit(msg.sender.id, now) {
            Verdict::Allowed => {
                debug!(player_id = msg.sender.id, error = %err, "Rejected input");
                out.push(Effect::send(msg.chat, err.user_message()));
            }
            Verdict::Suppressed => {
                debug!(player_id = msg.sender.id, "Rate limit tripped; reply suppressed");
                if let Some(message_id) = msg.message_id {
                    out.push(Effect::Delete {
                        chat: msg.chat,
                        message_id,
                    });
                }
            }
        }
    }
}
