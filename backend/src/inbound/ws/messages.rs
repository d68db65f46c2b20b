//! Wire-level message definitions for the chat WebSocket.
//!
//! Every outbound frame is a JSON object tagged by `kind`. Inbound frames are
//! either `{content, userName?}` objects or bare text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ChatMessage, ChatMessageId, SYSTEM_SENDER};

/// Inbound chat payload provided by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub content: String,
    #[serde(default, alias = "user_name")]
    pub user_name: Option<String>,
}

impl ChatRequest {
    /// Interpret a text frame. Anything that is not a JSON chat object is
    /// treated as the message content itself.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            content: text.to_owned(),
            user_name: None,
        })
    }
}

/// Persisted chat message as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: ChatMessageId,
    pub content: String,
    pub sender: String,
    pub sent_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(value: ChatMessage) -> Self {
        Self {
            id: value.id,
            content: value.content,
            sender: value.sender_name,
            sent_at: value.sent_at,
        }
    }
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Recent messages, oldest first, sent once on connect.
    History { messages: Vec<ChatMessageDto> },
    /// A newly persisted message.
    Message { message: ChatMessageDto },
    /// Another session joined.
    UserConnected { connected: usize },
    /// A session left.
    UserDisconnected { connected: usize },
    /// A problem with the caller's last frame.
    Error { sender: String, content: String },
}

impl ServerFrame {
    /// Error frame attributed to the system sender.
    pub fn system_error(content: impl Into<String>) -> Self {
        Self::Error {
            sender: SYSTEM_SENDER.to_owned(),
            content: content.into(),
        }
    }
}
