//! Persistence side of the community chat.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use super::ports::{ChatRepository, UserRepository};
use super::{
    ActorLoader, ChatDraft, ChatMessage, ChatMessageId, Error, Role, UserId, history_limit,
};

/// Chat counters for moderators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatStats {
    pub total_messages: u64,
    pub connected_sessions: usize,
}

/// Stores chat messages and serves their history.
#[derive(Clone)]
pub struct ChatService {
    actors: ActorLoader,
    messages: Arc<dyn ChatRepository>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn ChatRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            messages,
            clock,
        }
    }

    /// Persist a message received from a socket.
    pub async fn record(&self, draft: ChatDraft) -> Result<ChatMessage, Error> {
        let message = ChatMessage {
            id: ChatMessageId::random(),
            content: draft.content,
            sender_name: draft.sender_name,
            origin_ip: draft.origin_ip,
            sent_at: self.clock.utc(),
        };
        self.messages.insert(&message).await?;
        debug!(message_id = %message.id, sender = %message.sender_name, "chat message stored");
        Ok(message)
    }

    /// Latest `limit` messages in the order they were sent.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, Error> {
        Ok(self.messages.latest(limit).await?)
    }

    /// History for an authenticated user, clamping the requested size.
    pub async fn history(
        &self,
        actor: &UserId,
        requested: Option<i64>,
    ) -> Result<Vec<ChatMessage>, Error> {
        self.actors.load(actor).await?;
        self.recent(history_limit(requested)).await
    }

    /// Message count and live sessions. Presidents and administrators only.
    pub async fn stats(
        &self,
        actor: &UserId,
        connected_sessions: usize,
    ) -> Result<ChatStats, Error> {
        self.actors
            .load_with_role(actor, &[Role::President, Role::Administrator])
            .await?;
        Ok(ChatStats {
            total_messages: self.messages.count().await?,
            connected_sessions,
        })
    }

    /// Remove one message. Administrators only.
    pub async fn delete_message(&self, actor: &UserId, id: &ChatMessageId) -> Result<(), Error> {
        let actor = self
            .actors
            .load_with_role(actor, &[Role::Administrator])
            .await?;
        if !self.messages.delete(id).await? {
            return Err(Error::not_found(format!("message {id} not found")));
        }
        info!(message_id = %id, moderator = %actor.id, "chat message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockChatRepository, MockUserRepository};
    use crate::domain::test_support::{FixtureClock, fixture_date, user_with_role};
    use crate::domain::{ErrorCode, HISTORY_ON_CONNECT, User};
    use rstest::rstest;

    fn service(actor: User, messages: MockChatRepository) -> ChatService {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(actor.clone())));
        ChatService::new(
            Arc::new(users),
            Arc::new(messages),
            Arc::new(FixtureClock::at(fixture_date(), 20, 15)),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn record_stamps_time() {
        let mut messages = MockChatRepository::new();
        messages.expect_insert().times(1).returning(|_| Ok(()));
        let draft = ChatDraft::try_new("hello", None, "10.0.0.7").expect("draft");

        let message = service(user_with_role(Role::Resident, None), messages)
            .record(draft)
            .await
            .expect("stored");
        assert_eq!(message.sent_at, FixtureClock::at(fixture_date(), 20, 15).utc_now);
        assert_eq!(message.origin_ip, "10.0.0.7");
    }

    #[rstest]
    #[tokio::test]
    async fn history_defaults_limit() {
        let actor = user_with_role(Role::Resident, None);
        let id = actor.id;
        let mut messages = MockChatRepository::new();
        messages
            .expect_latest()
            .withf(|limit| *limit == HISTORY_ON_CONNECT)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        service(actor, messages)
            .history(&id, None)
            .await
            .expect("history");
    }

    #[rstest]
    #[tokio::test]
    async fn residents_cannot_read_stats() {
        let actor = user_with_role(Role::Resident, None);
        let id = actor.id;
        let error = service(actor, MockChatRepository::new())
            .stats(&id, 3)
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn stats_combine_count_and_sessions() {
        let actor = user_with_role(Role::President, None);
        let id = actor.id;
        let mut messages = MockChatRepository::new();
        messages.expect_count().returning(|| Ok(42));

        let stats = service(actor, messages).stats(&id, 3).await.expect("stats");
        assert_eq!(
            stats,
            ChatStats {
                total_messages: 42,
                connected_sessions: 3
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_missing_message_is_not_found() {
        let actor = user_with_role(Role::Administrator, None);
        let id = actor.id;
        let mut messages = MockChatRepository::new();
        messages.expect_delete().returning(|_| Ok(false));

        let error = service(actor, messages)
            .delete_message(&id, &ChatMessageId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
