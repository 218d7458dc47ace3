//! Bot-API style HTTP gateway implementing [`Channel`] and [`Moderation`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::commands::{Inbound, Sender};
use crate::domain::player::{ChatId, PlayerId};
use crate::effects::Asset;
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::ports::{Channel, Moderation};

const POLL_TIMEOUT_SECS: u64 = 30;

pub struct TelegramGateway {
    client: reqwest::Client,
    base: String,
    asset_base: Option<String>,
    offset: AtomicI64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    from: Option<User>,
    chat: Chat,
    text: Option<String>,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: String,
    from: User,
    message: Option<Message>,
    data: Option<String>,
}

impl From<User> for Sender {
    fn from(user: User) -> Self {
        let display_name = match user.last_name {
            Some(last) => format!("{} {last}", user.first_name),
            None => user.first_name,
        };
        Sender {
            id: user.id,
            display_name,
            username: user.username,
        }
    }
}

impl TelegramGateway {
    pub fn new(api_base: &str, token: &str, asset_base: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()?;
        Ok(Self {
            client,
            base: format!("{api_base}/bot{token}"),
            asset_base,
            offset: AtomicI64::new(0),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
        kind: InfraErrorKind,
    ) -> Result<T, DomainError> {
        let url = format!("{}/{method}", self.base);
        let fail = |detail: String| DomainError::infra(kind.clone(), format!("{method}: {detail}"));
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(e.without_url().to_string()))?;
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| fail(e.without_url().to_string()))?;
        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => {
                Err(fail(description.unwrap_or_else(|| "request rejected".into())))
            }
        }
    }

    async fn deliver(&self, method: &str, body: Value) -> Result<(), DomainError> {
        self.call::<Value>(method, body, InfraErrorKind::Delivery)
            .await
            .map(|_| ())
    }

    async fn moderate(&self, method: &str, body: Value) -> Result<(), DomainError> {
        self.call::<Value>(method, body, InfraErrorKind::Moderation)
            .await
            .map(|_| ())
    }

    fn inbound(&self, update: Update) -> Option<Inbound> {
        if let Some(query) = update.callback_query {
            let message = query.message?;
            let text = query.data?;
            let id = query.id;
            let client = self.client.clone();
            let url = format!("{}/answerCallbackQuery", self.base);
            // clears the button spinner; nothing depends on it
            tokio::spawn(async move {
                if let Err(e) = client.post(url).json(&json!({ "callback_query_id": id })).send().await {
                    debug!(error = %e.without_url(), "answerCallbackQuery failed");
                }
            });
            return Some(Inbound {
                sender: query.from.into(),
                chat: message.chat.id,
                private: message.chat.kind == "private",
                message_id: None,
                text,
                sent_at: None,
            });
        }
        let message = update.message?;
        let text = message.text?;
        let from = message.from?;
        Some(Inbound {
            sender: from.into(),
            chat: message.chat.id,
            private: message.chat.kind == "private",
            message_id: Some(message.message_id),
            text,
            sent_at: OffsetDateTime::from_unix_timestamp(message.date).ok(),
        })
    }
}

fn keyboard(choices: &[String]) -> Value {
    let row: Vec<Value> = choices
        .iter()
        .map(|c| json!({ "text": c, "callback_data": c }))
        .collect();
    json!({ "inline_keyboard": [row] })
}

#[async_trait]
impl Channel for TelegramGateway {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), DomainError> {
        self.deliver("sendMessage", json!({ "chat_id": to, "text": text }))
            .await
    }

    async fn send_prompt(
        &self,
        to: ChatId,
        text: &str,
        choices: &[String],
    ) -> Result<(), DomainError> {
        self.deliver(
            "sendMessage",
            json!({ "chat_id": to, "text": text, "reply_markup": keyboard(choices) }),
        )
        .await
    }

    async fn send_media(&self, to: ChatId, asset: Asset, caption: &str) -> Result<(), DomainError> {
        let Some(base) = &self.asset_base else {
            return self.send_text(to, caption).await;
        };
        let url = format!("{base}/{}", asset.file_name());
        let (method, field) = if asset.is_animation() {
            ("sendAnimation", "animation")
        } else {
            ("sendPhoto", "photo")
        };
        let mut body = json!({ "chat_id": to, "caption": caption });
        body[field] = Value::String(url);
        if let Err(e) = self.deliver(method, body).await {
            warn!(error = %e, ?asset, "Media delivery failed; falling back to text");
            return self.send_text(to, caption).await;
        }
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), DomainError> {
        self.deliver(
            "deleteMessage",
            json!({ "chat_id": chat, "message_id": message_id }),
        )
        .await
    }

    async fn next_updates(&self) -> Result<Vec<Inbound>, DomainError> {
        let offset = self.offset.load(Ordering::Relaxed);
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message", "callback_query"],
                }),
                InfraErrorKind::Delivery,
            )
            .await?;
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Relaxed);
        }
        Ok(updates
            .into_iter()
            .filter_map(|u| self.inbound(u))
            .collect())
    }
}

#[async_trait]
impl Moderation for TelegramGateway {
    async fn restrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.moderate(
            "restrictChatMember",
            json!({
                "chat_id": chat,
                "user_id": player,
                "permissions": { "can_send_messages": false },
            }),
        )
        .await
    }

    async fn unrestrict(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.moderate(
            "restrictChatMember",
            json!({
                "chat_id": chat,
                "user_id": player,
                "permissions": {
                    "can_send_messages": true,
                    "can_send_other_messages": true,
                    "can_add_web_page_previews": true,
                },
            }),
        )
        .await
    }

    /// Ban then unban: the member leaves but may rejoin later.
    async fn remove(&self, chat: ChatId, player: PlayerId) -> Result<(), DomainError> {
        self.moderate(
            "banChatMember",
            json!({ "chat_id": chat, "user_id": player }),
        )
        .await?;
        self.moderate(
            "unbanChatMember",
            json!({ "chat_id": chat, "user_id": player, "only_if_banned": true }),
        )
        .await
    }
}
