//! Shared WebSocket adapter state.
//!
//! The WebSocket entry point depends on the chat service and hub handed in
//! here rather than constructing them, so tests can run it against the
//! in-memory adapters.

use std::sync::Arc;

use url::Url;

use super::hub::ChatHub;
use crate::domain::ChatService;

/// Dependency bundle for the chat WebSocket.
#[derive(Clone)]
pub struct WsState {
    pub chat: ChatService,
    pub hub: ChatHub,
    pub allowed_origins: Arc<[Url]>,
}

impl WsState {
    /// Construct state from the chat service, hub and Origin allow-list.
    pub fn new(chat: ChatService, hub: ChatHub, allowed_origins: Vec<Url>) -> Self {
        Self {
            chat,
            hub,
            allowed_origins: allowed_origins.into(),
        }
    }
}
