//! Port abstraction for chat history.
use async_trait::async_trait;

use crate::domain::{ChatMessage, ChatMessageId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Store a message.
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepositoryError>;

    /// The `limit` most recent messages in chronological order.
    async fn latest(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// Number of stored messages.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Remove a message, reporting whether it existed.
    async fn delete(&self, id: &ChatMessageId) -> Result<bool, RepositoryError>;
}
