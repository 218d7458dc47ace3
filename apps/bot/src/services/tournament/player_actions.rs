use std::time::Duration;

use tracing::debug;

use super::{Stage, TournamentEngine};
use crate::commands::{Inbound, PlayerAction};
use crate::domain::player::PlayerStatus;
use crate::domain::rate_limit::Verdict;
use crate::effects::Effect;
use crate::errors::domain::{DomainError, ValidationKind};

impl TournamentEngine {
    pub(super) fn player_action(
        &mut self,
        msg: &Inbound,
        action: PlayerAction,
        now: Duration,
        out: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        if !matches!(self.stage, Stage::Running { .. }) {
            return Err(DomainError::validation(
                ValidationKind::NoActiveRound,
                "No round is running.",
            ));
        }
        if matches!(action, PlayerAction::Answer(_))
            && self.coordinator.answers_in_private()
            && !msg.private
        {
            return Err(DomainError::validation(
                ValidationKind::PrivateOnly,
                "Send your answer to me in a private chat.",
            ));
        }
        let step = self.coordinator.on_action(msg.sender.id, &action, now)?;
        debug!(player_id = msg.sender.id, action = action.name(), "Action accepted");
        self.limiter.clear(msg.sender.id);
        self.apply_step(step, now, out);
        Ok(())
    }

    /// Free text: an answer while a round wants one, otherwise channel noise.
    ///
    /// A chat line that misses the answer is just chat; only `/answer` gets
    /// told it was wrong.
    pub(super) fn chatter(
        &mut self,
        msg: &Inbound,
        text: String,
        now: Duration,
        out: &mut Vec<Effect>,
    ) -> Result<(), DomainError> {
        let Stage::Running { chat } = self.stage else {
            return Ok(());
        };
        if self.coordinator.wants_free_text_from(msg.sender.id, msg.private) {
            return match self.player_action(msg, PlayerAction::Answer(text), now, out) {
                Err(err) if err.validation_kind() == Some(&ValidationKind::WrongAnswer) => {
                    debug!(player_id = msg.sender.id, "Chat line is not the answer");
                    Ok(())
                }
                other => other,
            };
        }
        if msg.private || msg.chat != chat {
            return Ok(());
        }
        // the round's working copy knows about eliminations before the roster does
        let status = self
            .coordinator
            .participant(msg.sender.id)
            .or_else(|| self.roster.get(msg.sender.id))
            .map(|p| p.status);
        let silenced = status == Some(PlayerStatus::Eliminated);
        if !silenced {
            return Ok(());
        }
        if self.limiter.hit(msg.sender.id, now) == Verdict::Suppressed {
            debug!(player_id = msg.sender.id, "Eliminated player spamming the channel");
            if let Some(message_id) = msg.message_id {
                out.push(Effect::Delete { chat, message_id });
            }
        }
        Ok(())
    }
}
