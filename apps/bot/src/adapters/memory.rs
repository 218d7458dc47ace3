//! In-process fakes of every port, for tests and `--dry-run`.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tracing::info;

use crate::commands::Inbound;
use crate::domain::player::{ChatId, Player, PlayerId};
use crate::effects::Asset;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::ports::{Channel, Moderation, RosterStore};

/// Something the memory channel was asked to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Text { to: ChatId, text: String },
    Prompt { to: ChatId, text: String, choices: Vec<String> },
    Media { to: ChatId, asset: Asset, caption: String },
    Deleted { chat: ChatId, message_id: i64 },
}

impl Delivery {
    pub fn text(&self) -> Option<&str> {
        match self {
            Delivery::Text { text, .. } | Delivery::Prompt { text, .. } => Some(text),
            Delivery::Media { caption, .. } => Some(caption),
            Delivery::Deleted { .. } => None,
        }
    }

    pub fn target(&self) -> ChatId {
        match self {
            Delivery::Text { to, .. } | Delivery::Prompt { to, .. } | Delivery::Media { to, .. } => {
                *to
            }
            Delivery::Deleted { chat, .. } => *chat,
        }
    }
}

#[derive(Default)]
pub struct MemoryChannel {
    inbox: Mutex<VecDeque<Inbound>>,
    arrived: Notify,
    outbox: Mutex<Vec<Delivery>>,
    echo: bool,
}

impl MemoryChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A channel that also logs every delivery, for the dry-run binary.
    pub fn echoing() -> Arc<Self> {
        Arc::new(Self {
            echo: true,
            ..Self::default()
        })
    }

    pub async fn push_inbound(&self, msg: Inbound) {
        self.inbox.lock().await.push_back(msg);
        self.arrived.notify_one();
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.outbox.lock().await.clone()
    }

    async fn record(&self, delivery: Delivery) {
        if self.echo {
            info!(to = delivery.target(), text = delivery.text().unwrap_or(""), "deliver");
        }
        self.outbox.lock().await.push(delivery);
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), DomainError> {
        self.record(Delivery::Text {
            to,
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn send_prompt(
        &self,
        to: ChatId,
        text: &str,
        choices: &[String],
    ) -> Result<(), DomainError> {
        self.record(Delivery::Prompt {
            to,
            text: text.to_string(),
            choices: choices.to_vec(),
        })
        .await;
        Ok(())
    }

    async fn send_media(&self, to: ChatId, asset: Asset, caption: &str) -> Result<(), DomainError> {
        self.record(Delivery::Media {
            to,
            asset,
            caption: caption.to_string(),
        })
        .await;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), DomainError> {
        self.record(Delivery::Deleted { chat, message_id }).await;
        Ok(())
    }

    async fn next_updates(&self) -> Result<Vec<Inbound>, DomainError> {
        loop {
            let batch: Vec<Inbound> = self.inbox.lock().await.drain(..).collect();
            if !batch.is_empty() {
                return Ok(batch);
            }
            self.arrived.notified().await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationCall {
    Restrict(ChatId, PlayerId),
    Unrestrict(ChatId, PlayerId),
    Remove(ChatId, PlayerId),
}

/// Records moderation calls; optionally refuses them all.
#[derive(Default)]
pub struct MemoryModeration {
    calls: Mutex<Vec<ModerationCall>>,
    deny: bool,
}

impl MemoryModeration {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Behaves like a bot without admin rights.
    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            deny: true,
            ..Self::default()
        })
    }

    pub async fn calls(&self) -> Vec<ModerationCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: ModerationCall) -> Result<(), DomainError> {
        self.calls.lock().await.push(call);
        if self.deny {
            return Err(DomainError::infra(
                InfraErrorKind::Moderation,
                "not enough rights to manage members",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Moderation for MemoryModeration {
    async fn restrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.record(ModerationCall::Restrict(chat, player)).await
    }

    async fn unrestrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.record(ModerationCall::Unrestrict(chat, player)).await
    }

    async fn remove(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.record(ModerationCall::Remove(chat, player)).await
    }
}

#[derive(Default)]
pub struct MemoryStore {
    players: Mutex<Vec<Player>>,
    saves: Mutex<usize>,
    fail_loads: bool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_players(players: Vec<Player>) -> Arc<Self> {
        Arc::new(Self {
            players: Mutex::new(players),
            ..Self::default()
        })
    }

    /// A store whose contents can never be read back.
    pub fn corrupt() -> Arc<Self> {
        Arc::new(Self {
            fail_loads: true,
            ..Self::default()
        })
    }

    pub async fn snapshot(&self) -> Vec<Player> {
        self.players.lock().await.clone()
    }

    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Player>, DomainError> {
        if self.fail_loads {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                "stored roster is unreadable",
            ));
        }
        Ok(self.players.lock().await.clone())
    }

    async fn save(&self, players: &[Player]) -> Result<(), DomainError> {
        *self.players.lock().await = players.to_vec();
        *self.saves.lock().await += 1;
        Ok(())
    }
}
