//! PostgreSQL-backed `ChatRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ChatRepository, RepositoryError};
use crate::domain::{ChatMessage, ChatMessageId};

use super::diesel_helpers::{count_to_u64, map_diesel_error, map_pool_error};
use super::models::ChatMessageRow;
use super::pool::DbPool;
use super::schema::chat_messages;

/// Diesel-backed implementation of the chat repository port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_message(row: ChatMessageRow) -> ChatMessage {
    ChatMessage {
        id: ChatMessageId::from_uuid(row.id),
        content: row.content,
        sender_name: row.sender_name,
        origin_ip: row.origin_ip,
        sent_at: row.sent_at,
    }
}

/// Newest-first rows back into chronological order.
fn chronological(mut rows: Vec<ChatMessageRow>) -> Vec<ChatMessage> {
    rows.reverse();
    rows.into_iter().map(row_to_message).collect()
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ChatMessageRow {
            id: *message.id.as_uuid(),
            content: message.content.clone(),
            sender_name: message.sender_name.clone(),
            origin_ip: message.origin_ip.clone(),
            sent_at: message.sent_at,
        };
        diesel::insert_into(chat_messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ChatMessageRow> = chat_messages::table
            .order((chat_messages::sent_at.desc(), chat_messages::id.desc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(ChatMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(chronological(rows))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = chat_messages::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn delete(&self, id: &ChatMessageId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(chat_messages::table.filter(chat_messages::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
