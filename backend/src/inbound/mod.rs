//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; the chat WebSocket lives under [`ws`].
//! Both share one [`ws::ChatHub`] so HTTP statistics see live sessions.

pub mod http;
pub mod ws;
