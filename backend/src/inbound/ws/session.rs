//! Per-connection chat WebSocket handler.
//!
//! Keeps WebSocket framing and heartbeats at the edge while deferring
//! persistence to the injected [`ChatService`] and fan-out to the
//! [`ChatHub`]. The public contract pings every 5s and considers a
//! connection idle after 10s without client traffic. Tests shorten these
//! intervals to speed up feedback.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tracing::{debug, info, warn};

use super::hub::{ChatHub, Membership};
use super::messages::{ChatRequest, ServerFrame};
use crate::domain::{ChatDraft, ChatService, HISTORY_ON_CONNECT};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

pub(super) async fn handle_ws_session(
    chat: ChatService,
    hub: ChatHub,
    peer_ip: String,
    session: Session,
    stream: MessageStream,
) {
    WsSession {
        chat,
        hub,
        peer_ip,
    }
    .run(session, stream)
    .await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    HubClosed,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    chat: ChatService,
    hub: ChatHub,
    peer_ip: String,
}

impl WsSession {
    async fn run(&self, mut session: Session, mut stream: MessageStream) {
        let mut membership = self.hub.join();
        info!(peer = %self.peer_ip, connected = self.hub.connected(), "chat session opened");

        let outcome = match self.greet(&mut session, &membership).await {
            Ok(()) => {
                self.pump(&mut session, &mut stream, &mut membership)
                    .await
            }
            Err(error) => SessionError::Network(error),
        };

        drop(membership);
        self.hub.publish(
            None,
            ServerFrame::UserDisconnected {
                connected: self.hub.connected(),
            },
        );
        info!(peer = %self.peer_ip, connected = self.hub.connected(), "chat session closed");

        self.log_shutdown_reason(&outcome);
        let close_action = self.close_action_for(&outcome);
        self.close_session_if_needed(session, close_action).await;
    }

    /// Send recent history to the newcomer and announce it to everyone else.
    async fn greet(&self, session: &mut Session, membership: &Membership) -> Result<(), Closed> {
        match self.chat.recent(HISTORY_ON_CONNECT).await {
            Ok(messages) => {
                let frame = ServerFrame::History {
                    messages: messages.into_iter().map(Into::into).collect(),
                };
                self.send_json(session, &frame).await?;
            }
            Err(error) => {
                warn!(message = %error.message(), "failed to load chat history");
                self.send_json(session, &ServerFrame::system_error("history unavailable"))
                    .await?;
            }
        }
        self.hub.publish(
            Some(membership.id()),
            ServerFrame::UserConnected {
                connected: self.hub.connected(),
            },
        );
        Ok(())
    }

    async fn pump(
        &self,
        session: &mut Session,
        stream: &mut MessageStream,
        membership: &mut Membership,
    ) -> SessionError {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(session, &mut last_heartbeat, message)
                        .await
                }
                frame = membership.recv() => {
                    self.handle_broadcast(session, frame).await
                }
            };

            if let Err(error) = result {
                return error;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref())
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(&self, session: &mut Session, text: &str) -> Result<(), Closed> {
        let request = ChatRequest::parse(text);
        let draft = match ChatDraft::try_new(
            &request.content,
            request.user_name.as_deref(),
            &self.peer_ip,
        ) {
            Ok(draft) => draft,
            Err(error) => {
                debug!(message = %error.message(), "rejected chat message");
                return self
                    .send_json(session, &ServerFrame::system_error(error.message()))
                    .await;
            }
        };

        match self.chat.record(draft).await {
            Ok(message) => {
                // Published without an origin so the author sees its own message too.
                self.hub.publish(
                    None,
                    ServerFrame::Message {
                        message: message.into(),
                    },
                );
                Ok(())
            }
            Err(error) => {
                warn!(message = %error.message(), "failed to store chat message");
                self.send_json(session, &ServerFrame::system_error("message could not be saved"))
                    .await
            }
        }
    }

    async fn handle_broadcast(
        &self,
        session: &mut Session,
        frame: Result<ServerFrame, RecvError>,
    ) -> Result<(), SessionError> {
        match frame {
            Ok(frame) => self
                .send_json(session, &frame)
                .await
                .map_err(SessionError::Network),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "chat session fell behind; frames dropped");
                Ok(())
            }
            Err(RecvError::Closed) => Err(SessionError::HubClosed),
        }
    }

    async fn send_json(&self, session: &mut Session, frame: &ServerFrame) -> Result<(), Closed> {
        match serde_json::to_string(frame) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::HubClosed => warn!("chat hub closed; ending session"),
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::HubClosed => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action
            && let Err(error) = session.close(reason).await
        {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
