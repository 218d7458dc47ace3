//! Registration window: `/start N` opens N slots, `/join` fills them.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::info;

use crate::commands::Sender;
use crate::domain::player::{Player, PlayerStatus};
use crate::domain::roster::Roster;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Closed,
    Open { slots: u32, closes_at: Duration },
}

#[derive(Debug, Clone)]
pub struct Registration {
    window: Window,
}

/// Result of a successful `/join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinReceipt {
    pub registered: u32,
    pub slots: u32,
}

impl JoinReceipt {
    pub fn is_full(&self) -> bool {
        self.registered >= self.slots
    }
}

impl Registration {
    pub fn new() -> Self {
        Self {
            window: Window::Closed,
        }
    }

    pub fn open(&mut self, slots: u32, now: Duration, window: Duration) -> Result<(), DomainError> {
        if slots == 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidSlots,
                "Please provide a valid number of slots (e.g. /start 10).",
            ));
        }
        self.window = Window::Open {
            slots,
            closes_at: now + window,
        };
        info!(slots, "Registration opened");
        Ok(())
    }

    pub fn close(&mut self) {
        self.window = Window::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.window, Window::Open { .. })
    }

    pub fn closes_at(&self) -> Option<Duration> {
        match self.window {
            Window::Open { closes_at, .. } => Some(closes_at),
            Window::Closed => None,
        }
    }

    pub fn slots(&self) -> Option<u32> {
        match self.window {
            Window::Open { slots, .. } => Some(slots),
            Window::Closed => None,
        }
    }

    /// Register `sender` on `roster`. Only valid from a private chat.
    pub fn join(
        &mut self,
        roster: &mut Roster,
        sender: &Sender,
        private: bool,
        joined_at: Option<OffsetDateTime>,
    ) -> Result<JoinReceipt, DomainError> {
        let Window::Open { slots, .. } = self.window else {
            return Err(DomainError::validation(
                ValidationKind::RegistrationClosed,
                "Registration is not open right now. Wait for the host to start a game.",
            ));
        };
        if !private {
            return Err(DomainError::validation(
                ValidationKind::PrivateOnly,
                "Send /join to me in a private chat to register.",
            ));
        }
        if roster.contains(sender.id) {
            return Err(DomainError::validation(
                ValidationKind::AlreadyRegistered,
                "You already joined!",
            ));
        }
        let registered = roster.count(PlayerStatus::Registered) as u32;
        if registered >= slots {
            return Err(DomainError::validation(
                ValidationKind::RegistrationFull,
                "All slots are filled!",
            ));
        }

        let mut player =
            Player::new(sender.id, sender.display_name.clone()).with_username(sender.username.clone());
        player.joined_at = joined_at;
        roster.add(player)?;

        let receipt = JoinReceipt {
            registered: registered + 1,
            slots,
        };
        info!(
            player_id = sender.id,
            registered = receipt.registered,
            slots,
            "Player registered"
        );
        Ok(receipt)
    }
}

impl Default for Registration {
    fn default() -> Self {
        Self::new()
    }
}
