use async_trait::async_trait;

use crate::domain::player::{ChatId, PlayerId};
use crate::errors::domain::DomainError;

/// Channel membership controls. Failures never undo game state.
#[async_trait]
pub trait Moderation: Send + Sync {
    async fn restrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError>;

    async fn unrestrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError>;

    async fn remove(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError>;
}
