use std::time::Duration;

use tracing::{error, info, warn};

use super::{Stage, TournamentEngine};
use crate::commands::Inbound;
use crate::domain::player::{ChatId, Player, PlayerStatus};
use crate::domain::roster::Roster;
use crate::domain::seed_derivation::{derive_round_seed, derive_schedule_seed};
use crate::effects::{Asset, Effect};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::services::coordinator::{RoundReport, RoundSpec, Step};
use crate::services::scheduler::{Decision, Finale, PendingRound, Scheduler};

impl TournamentEngine {
    /// `/start N`: clear the roster and open registration in this group.
    pub(super) fn open_registration(
        &mut self,
        msg: &Inbound,
        slots: Option<u32>,
        now: Duration,
        out: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        if matches!(self.stage, Stage::Loading { .. } | Stage::Running { .. }) {
            return Err(DomainError::validation(
                ValidationKind::TournamentRunning,
                "A tournament is already running. Use /stopgame first.",
            ));
        }
        if msg.private {
            return Err(DomainError::validation(
                ValidationKind::GroupOnly,
                "Use /start in the group chat where the game will be played.",
            ));
        }
        let window = self.config.timings.registration_window;
        self.registration.open(slots.unwrap_or(0), now, window)?;
        self.roster.clear();
        self.limiter.reset();
        self.stage = Stage::Registering { chat: msg.chat };

        out.push(Effect::SaveRoster(Vec::new()));
        out.push(Effect::SendMedia {
            to: msg.chat,
            asset: Asset::RegistrationBanner,
            caption: format!(
                "🎮 Registration is open!\n👥 Slots: {}\n🕒 You have {}s to register.\n\
                 🟢 Send /join to me in a private chat.\n\
                 Registration closes automatically once all slots are filled.",
                slots.unwrap_or(0),
                window.as_secs()
            ),
        });
        Ok(())
    }

    /// `/join` from a private chat.
    pub(super) fn join(&mut self, msg: &Inbound, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        let chat = match self.stage {
            Stage::Registering { chat } => chat,
            _ => {
                return Err(DomainError::validation(
                    ValidationKind::RegistrationClosed,
                    "Registration is not open right now. Wait for the host to start a game.",
                ))
            }
        };
        let receipt = match self
            .registration
            .join(&mut self.roster, &msg.sender, msg.private, msg.sent_at)
        {
            Ok(receipt) => receipt,
            Err(err) => {
                if err.validation_kind() == Some(&ValidationKind::RegistrationFull) {
                    out.push(Effect::send(
                        chat,
                        format!(
                            "⚠️ {} tried to join, but all slots are full!",
                            msg.sender.display_name
                        ),
                    ));
                }
                return Err(err);
            }
        };

        let handle = self
            .roster
            .get(msg.sender.id)
            .map(Player::handle)
            .unwrap_or_else(|| msg.sender.display_name.clone());
        out.push(Effect::SaveRoster(self.roster.to_records()));
        out.push(Effect::send(
            msg.chat,
            format!("✅ You joined the game! Good luck, {handle}."),
        ));
        out.push(Effect::send(
            chat,
            format!(
                "✅ {handle} joined the game! ({}/{} players)",
                receipt.registered, receipt.slots
            ),
        ));

        if receipt.is_full() {
            self.registration.close();
            out.push(Effect::send(chat, "🎉 All slots are full! Registration is closed."));
            self.start_loading(chat, out);
        }
        Ok(())
    }

    /// `/begin`: close registration early, or start with a restored roster.
    pub(super) fn begin(&mut self, msg: &Inbound, out: &mut Vec<Effect>) -> Result<(), DomainError> {
        match self.stage {
            Stage::Loading { .. } | Stage::Running { .. } => Err(DomainError::validation(
                ValidationKind::TournamentRunning,
                "A tournament is already running.",
            )),
            Stage::Registering { chat } => {
                self.registration.close();
                self.close_or_cancel(chat, "Registration closed by the host.", out);
                Ok(())
            }
            Stage::Idle => {
                if msg.private {
                    return Err(DomainError::validation(
                        ValidationKind::GroupOnly,
                        "Use /begin in the group chat where the game will be played.",
                    ));
                }
                if self.roster.count(PlayerStatus::Registered) == 0 {
                    return Err(DomainError::validation(
                        ValidationKind::EmptyRoster,
                        "Nobody is registered. Open registration with /start N.",
                    ));
                }
                self.start_loading(msg.chat, out);
                Ok(())
            }
        }
    }

    fn close_or_cancel(&mut self, chat: ChatId, notice: &str, out: &mut Vec<Effect>) {
        if self.roster.count(PlayerStatus::Registered) == 0 {
            info!("Registration closed with no players; cancelled");
            out.push(Effect::send(chat, "😢 No players joined. Game canceled."));
            self.stage = Stage::Idle;
            return;
        }
        out.push(Effect::send(chat, format!("⏰ {notice}")));
        self.start_loading(chat, out);
    }

    fn start_loading(&mut self, chat: ChatId, out: &mut Vec<Effect>) {
        self.stage = Stage::Loading { chat };
        out.push(Effect::LoadRoster);
    }

    pub(super) fn on_roster_loaded(
        &mut self,
        loaded: Result<Vec<Player>, DomainError>,
        now: Duration,
        out: &mut Vec<Effect>,
    ) {
        let Stage::Loading { chat } = self.stage else {
            warn!(stage = ?self.stage, "Roster load arrived outside of loading; ignored");
            return;
        };

        let roster = match loaded.and_then(Roster::from_records) {
            Ok(roster) => roster,
            Err(err) => {
                error!(error = %err, "Roster store unreadable; tournament not started");
                self.stage = Stage::Idle;
                out.push(Effect::NotifyOperator(format!(
                    "⚠️ The roster store could not be read ({err}). The tournament did not start."
                )));
                out.push(Effect::send(
                    chat,
                    "⚠️ The game could not be started. The host has been notified.",
                ));
                return;
            }
        };
        self.roster = roster;
        let promoted = self.roster.promote_registered();

        self.tournament_no += 1;
        self.scheduler = Scheduler::new(
            derive_schedule_seed(self.config.seed, self.tournament_no),
            self.config.timings.max_rounds,
        );
        let prep = self.config.timings.preparation;
        match self.scheduler.begin(&self.roster, now, prep) {
            Ok(first) => {
                self.stage = Stage::Running { chat };
                self.limiter.reset();
                info!(
                    tournament = self.tournament_no,
                    promoted,
                    alive = self.roster.alive_count(),
                    "Tournament begins"
                );
                out.push(Effect::SaveRoster(self.roster.to_records()));
                out.push(Effect::send(
                    chat,
                    format!(
                        "🔺 The games begin with {} players! Round 1 starts in {}s.",
                        self.roster.alive_count(),
                        first.at.saturating_sub(now).as_secs()
                    ),
                ));
            }
            Err(err) => {
                warn!(error = %err, "Tournament cannot begin");
                self.stage = Stage::Idle;
                out.push(Effect::send(chat, err.user_message()));
                out.push(Effect::NotifyOperator(format!(
                    "The tournament did not start: {err}"
                )));
            }
        }
    }

    pub(super) fn on_tick(&mut self, now: Duration, out: &mut Vec<Effect>) {
        if let Stage::Registering { chat } = self.stage {
            if self.registration.closes_at().is_some_and(|at| at <= now) {
                self.registration.close();
                self.close_or_cancel(chat, "Time's up! Registration closed.", out);
            }
            return;
        }
        if !matches!(self.stage, Stage::Running { .. }) {
            return;
        }
        if let Some(pending) = self.scheduler.take_due(now) {
            self.start_round(pending, now, out);
        }
        let step = self.coordinator.on_deadline(now);
        self.apply_step(step, now, out);
    }

    pub(super) fn start_round(&mut self, pending: PendingRound, now: Duration, out: &mut Vec<Effect>) {
        let Stage::Running { chat } = self.stage else {
            return;
        };
        let spec = RoundSpec {
            kind: pending.kind,
            round_no: pending.round_no,
            chat,
            timings: self.config.timings.clone(),
            seed: derive_round_seed(self.config.seed, self.tournament_no, pending.round_no),
        };
        match self.coordinator.start(spec, self.roster.snapshot_alive(), now) {
            Ok(step) => self.apply_step(step, now, out),
            Err(err) => error!(error = %err, "Round could not start"),
        }
    }

    pub(super) fn apply_step(&mut self, step: Step, now: Duration, out: &mut Vec<Effect>) {
        out.extend(step.effects);
        if let Some(report) = step.finished {
            self.on_round_finished(report, now, out);
        }
    }

    fn on_round_finished(&mut self, report: RoundReport, now: Duration, out: &mut Vec<Effect>) {
        let Stage::Running { chat } = self.stage else {
            return;
        };
        let committed = self.roster.commit(report.players);
        let kick_delay = self.config.timings.kick_delay;
        for player in &committed.eliminated {
            out.push(Effect::Remove {
                chat,
                player: *player,
                after: kick_delay,
            });
        }
        out.push(Effect::SaveRoster(self.roster.to_records()));
        info!(
            round = report.round_no,
            kind = ?report.kind,
            eliminated = committed.eliminated.len(),
            alive = self.roster.alive_count(),
            "Round committed"
        );

        let cooldown = self.config.timings.round_cooldown;
        match self
            .scheduler
            .after_round(&self.roster, report.outcome, now, cooldown)
        {
            Decision::Next(next) => out.push(Effect::send(
                chat,
                format!(
                    "Round {} is over. {} players remain. Round {} ({}) starts in {}s.",
                    report.round_no,
                    self.roster.alive_count(),
                    next.round_no,
                    next.kind.title(),
                    cooldown.as_secs()
                ),
            )),
            Decision::Finished(finale) => self.finalize(chat, finale, out),
        }
    }

    fn finalize(&mut self, chat: ChatId, finale: Finale, out: &mut Vec<Effect>) {
        match &finale {
            Finale::NoSurvivors => {
                out.push(Effect::send(
                    chat,
                    "💀 Everyone has been eliminated. There is no winner this time.",
                ));
            }
            Finale::Champion(id) => {
                if self.roster.get(*id).is_some_and(Player::is_alive) {
                    if let Err(err) = self.roster.crown(*id) {
                        warn!(player_id = id, error = %err, "Could not crown champion");
                    }
                }
                let handle = self
                    .roster
                    .get(*id)
                    .map(Player::handle)
                    .unwrap_or_else(|| format!("player {id}"));
                out.push(Effect::SendMedia {
                    to: chat,
                    asset: Asset::Champion,
                    caption: format!("🏆 {handle} is the last one standing and wins the games!"),
                });
            }
            Finale::Survivors(ids) => {
                let mut names = Vec::new();
                for id in ids {
                    if let Err(err) = self.roster.crown(*id) {
                        warn!(player_id = id, error = %err, "Could not crown survivor");
                    }
                    if let Some(p) = self.roster.get(*id) {
                        names.push(p.handle());
                    }
                }
                out.push(Effect::send(
                    chat,
                    format!("🎉 All rounds are over! Winners: {}", names.join(", ")),
                ));
            }
        }
        out.push(Effect::SaveRoster(self.roster.to_records()));
        self.stage = Stage::Idle;
    }

    /// Stop everything in flight, pending removals included. Committed roster
    /// state is kept.
    pub(super) fn abort(&mut self, now: Duration, out: &mut Vec<Effect>) -> bool {
        let chat = match self.stage {
            Stage::Idle => return false,
            Stage::Registering { chat } | Stage::Loading { chat } | Stage::Running { chat } => chat,
        };
        out.extend(self.coordinator.cancel(now));
        out.push(Effect::CancelRemovals);
        self.scheduler.abort();
        self.registration.close();
        self.stage = Stage::Idle;
        info!(chat, "Tournament aborted");
        out.push(Effect::send(chat, "🛑 The game has been stopped by the host."));
        out.push(Effect::SaveRoster(self.roster.to_records()));
        true
    }
}
