use std::fmt::Write as _;
use std::time::Duration;

use tracing::{debug, info};

use super::{Stage, TournamentEngine};
use crate::commands::Inbound;
use crate::domain::player::PlayerStatus;
use crate::effects::Effect;
use crate::errors::domain::{DomainError, ValidationKind};

impl TournamentEngine {
    /// `/stopgame`. Stopping an idle bot is a no-op.
    pub(super) fn stop_game(&mut self, now: Duration, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        if !self.abort(now, out) {
            debug!("Stop requested while idle; nothing to do");
        }
        Ok(())
    }

    /// `/stopround`: resolve the running round immediately.
    pub(super) fn stop_round(&mut self, now: Duration, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        if !self.coordinator.is_active() {
            return Err(DomainError::validation(
                ValidationKind::WrongPhase,
                "No round is running right now.",
            ));
        }
        let step = self.coordinator.force_resolve(now)?;
        self.apply_step(step, now, out);
        Ok(())
    }

    pub(super) fn list_roster(&mut self, msg: &Inbound, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        if self.roster.is_empty() {
            out.push(Effect::send(msg.chat, "The roster is empty."));
            return Ok(());
        }
        let mut text = format!("📋 Roster ({} players)\n", self.roster.len());
        for status in [
            PlayerStatus::Alive,
            PlayerStatus::Registered,
            PlayerStatus::Winner,
            PlayerStatus::Eliminated,
        ] {
            let group = self.roster.with_status(status);
            if group.is_empty() {
                continue;
            }
            let names: Vec<String> = group.iter().map(|p| p.handle()).collect();
            let _ = writeln!(text, "{} ({}): {}", status.as_str(), group.len(), names.join(", "));
        }
        out.push(Effect::send(msg.chat, text.trim_end()));
        Ok(())
    }

    pub(super) fn report_status(
        &mut self,
        msg: &Inbound,
        now: Duration,
        out: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        let mut text = String::new();
        match self.stage {
            Stage::Idle => text.push_str("Idle. Open registration with /start N."),
            Stage::Registering { .. } => {
                let _ = write!(
                    text,
                    "Registration open: {}/{} joined.",
                    self.roster.count(PlayerStatus::Registered),
                    self.registration.slots().unwrap_or(0)
                );
            }
            Stage::Loading { .. } => text.push_str("Starting the tournament..."),
            Stage::Running { .. } => {
                let _ = write!(
                    text,
                    "Tournament #{} running. {} alive, round {}/{}.",
                    self.tournament_no,
                    self.roster.alive_count(),
                    self.scheduler.rounds_started(),
                    self.scheduler.max_rounds()
                );
                if let (Some(kind), Some(phase)) = (self.coordinator.kind(), self.coordinator.phase()) {
                    let _ = write!(text, "\nCurrent: {} ({phase}).", kind.title());
                } else if let Some(next) = self.scheduler.pending() {
                    let _ = write!(text, "\nNext: {}.", next.kind.title());
                }
            }
        }
        if let Some(at) = self.next_deadline() {
            let _ = write!(text, "\nNext deadline in {}s.", at.saturating_sub(now).as_secs());
        }
        out.push(Effect::send(msg.chat, text));
        Ok(())
    }

    /// `/reset`: abort whatever is running and wipe the roster.
    pub(super) fn reset(&mut self, msg: &Inbound, now: Duration, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        self.abort(now, out);
        let cleared = self.roster.len();
        self.roster.clear();
        self.limiter.reset();
        info!(cleared, "Roster reset");
        out.push(Effect::SaveRoster(Vec::new()));
        out.push(Effect::send(
            msg.chat,
            format!("🧹 Roster cleared ({cleared} players removed)."),
        ));
        Ok(())
    }
}
