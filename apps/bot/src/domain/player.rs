use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;

use crate::domain::round_state::RoundState;
use crate::errors::domain::{DomainError, ValidationKind};

/// Stable identity of a participant, as issued by the chat gateway.
pub type PlayerId = i64;

/// Identity of a chat (group channel or private conversation).
pub type ChatId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Registered,
    Alive,
    Eliminated,
    Winner,
}

impl PlayerStatus {
    /// Allowed edges: `registered -> alive -> (eliminated | winner)`.
    pub fn can_become(self, next: PlayerStatus) -> bool {
        use PlayerStatus::*;
        matches!(
            (self, next),
            (Registered, Alive) | (Alive, Eliminated) | (Alive, Winner)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Registered => "registered",
            PlayerStatus::Alive => "alive",
            PlayerStatus::Eliminated => "eliminated",
            PlayerStatus::Winner => "winner",
        }
    }
}

/// One roster entry. Persisted as-is by the roster store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub status: PlayerStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub joined_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub round_state: RoundState,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            username: None,
            status: PlayerStatus::Registered,
            joined_at: None,
            round_state: RoundState::Idle,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_status(mut self, status: PlayerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    /// Move along a permitted status edge; anything else is rejected untouched.
    pub fn transition(&mut self, next: PlayerStatus) -> Result<(), DomainError> {
        if !self.status.can_become(next) {
            return Err(DomainError::validation(
                ValidationKind::Other("illegal status transition".into()),
                format!(
                    "player {} cannot go from {} to {}",
                    self.id,
                    self.status.as_str(),
                    next.as_str()
                ),
            ));
        }
        self.status = next;
        Ok(())
    }

    /// How the player is addressed in channel messages.
    pub fn handle(&self) -> String {
        match &self.username {
            Some(u) => format!("@{u}"),
            None => self.display_name.clone(),
        }
    }

    /// Whether `/pick @x` or `/vote @x` style text refers to this player.
    pub fn matches_mention(&self, mention: &str) -> bool {
        let wanted = normalize_mention(mention);
        if wanted.is_empty() {
            return false;
        }
        if let Some(username) = &self.username {
            if normalize_mention(username) == wanted {
                return true;
            }
        }
        normalize_mention(&self.display_name) == wanted
    }
}

/// Trim, drop a leading `@`, NFKC-normalize and lowercase.
pub fn normalize_mention(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('@')
        .nfkc()
        .collect::<String>()
        .to_lowercase()
}
