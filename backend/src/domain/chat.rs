//! Community chat messages.

use chrono::{DateTime, Utc};

use super::text::required_text;
use super::{ChatMessageId, Error};

/// Sender recorded when a client does not name itself.
pub const DEFAULT_SENDER: &str = "User";
/// Sender of server-generated notices.
pub const SYSTEM_SENDER: &str = "System";
/// Messages replayed to a freshly connected session.
pub const HISTORY_ON_CONNECT: usize = 50;
/// Largest history page served over REST.
pub const MAX_HISTORY: usize = 200;

const CONTENT_MAX: usize = 1000;
const SENDER_MAX: usize = 100;

/// Validated chat message awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDraft {
    pub content: String,
    pub sender_name: String,
    pub origin_ip: String,
}

impl ChatDraft {
    /// Validate the text and fall back to [`DEFAULT_SENDER`] for blank names.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::ChatDraft;
    ///
    /// let draft = ChatDraft::try_new(" hello ", Some(""), "10.0.0.1").unwrap();
    /// assert_eq!(draft.content, "hello");
    /// assert_eq!(draft.sender_name, "User");
    /// ```
    pub fn try_new(content: &str, sender: Option<&str>, origin_ip: &str) -> Result<Self, Error> {
        let content = required_text(content, "content", CONTENT_MAX)?;
        let sender_name = match sender.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.chars().take(SENDER_MAX).collect(),
            None => DEFAULT_SENDER.to_owned(),
        };
        Ok(Self {
            content,
            sender_name,
            origin_ip: origin_ip.to_owned(),
        })
    }
}

/// Persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub content: String,
    pub sender_name: String,
    pub origin_ip: String,
    pub sent_at: DateTime<Utc>,
}

/// Clamp a requested history size to `1..=MAX_HISTORY`, defaulting to
/// [`HISTORY_ON_CONNECT`].
pub fn history_limit(requested: Option<i64>) -> usize {
    requested
        .and_then(|value| usize::try_from(value).ok())
        .map_or(HISTORY_ON_CONNECT, |value| value.clamp(1, MAX_HISTORY))
}
