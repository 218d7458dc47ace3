//! Chat transport port.

use async_trait::async_trait;

use crate::commands::Inbound;
use crate::domain::player::ChatId;
use crate::effects::Asset;
use crate::errors::domain::DomainError;

#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), DomainError>;

    /// Send `text` with one button per choice.
    async fn send_prompt(
        &self,
        to: ChatId,
        text: &str,
        choices: &[String],
    ) -> Result<(), DomainError>;

    async fn send_media(&self, to: ChatId, asset: Asset, caption: &str) -> Result<(), DomainError>;

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), DomainError>;

    /// Long-poll for the next batch of inbound messages.
    async fn next_updates(&self) -> Result<Vec<Inbound>, DomainError>;
}
