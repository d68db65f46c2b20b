//! Chat REST handlers. Live traffic goes through `/ws/chat`.

use actix_web::{HttpResponse, delete, get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ChatMessageId, ChatStats, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};
use crate::inbound::ws::messages::ChatMessageDto;

/// `?limit=` for the history endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Number of messages, 1 to 200. Defaults to 50.
    pub limit: Option<i64>,
}

/// Moderation counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatsDto {
    pub total_messages: u64,
    pub connected_sessions: usize,
}

impl From<ChatStats> for ChatStatsDto {
    fn from(stats: ChatStats) -> Self {
        Self {
            total_messages: stats.total_messages,
            connected_sessions: stats.connected_sessions,
        }
    }
}

/// Liveness of the chat relay.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatus {
    #[schema(example = "online")]
    pub status: String,
    pub connected_sessions: usize,
}

/// Most recent messages, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/chat/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Chat history", body = [ChatMessageDto]),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["chat"],
    operation_id = "chatHistory"
)]
#[get("/chat/history")]
pub async fn chat_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Vec<ChatMessageDto>>> {
    let user_id = session.require_user_id()?;
    let messages = state.chat.history(&user_id, query.limit).await?;
    Ok(web::Json(
        messages.into_iter().map(ChatMessageDto::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/stats",
    responses(
        (status = 200, description = "Message and session counts", body = ChatStatsDto),
        (status = 403, description = "Presidents and administrators only", body = Error)
    ),
    tags = ["chat"],
    operation_id = "chatStats"
)]
#[get("/chat/stats")]
pub async fn chat_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ChatStatsDto>> {
    let user_id = session.require_user_id()?;
    let stats = state
        .chat
        .stats(&user_id, state.chat_hub.connected())
        .await?;
    Ok(web::Json(stats.into()))
}

/// Remove a message. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/chat/messages/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Unknown message", body = Error)
    ),
    tags = ["chat"],
    operation_id = "deleteChatMessage"
)]
#[delete("/chat/messages/{id}")]
pub async fn delete_chat_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: ChatMessageId = parse_id(&path, FieldName::new("id"))?;
    state.chat.delete_message(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/status",
    responses((status = 200, description = "Relay status", body = ChatStatus)),
    tags = ["chat"],
    operation_id = "chatStatus",
    security([])
)]
#[get("/chat/status")]
pub async fn chat_status(state: web::Data<HttpState>) -> web::Json<ChatStatus> {
    web::Json(ChatStatus {
        status: "online".to_owned(),
        connected_sessions: state.chat_hub.connected(),
    })
}
