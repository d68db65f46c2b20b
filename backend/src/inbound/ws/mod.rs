//! WebSocket inbound adapter for the community chat.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured Origin allow-list
//! - spawn the per-connection session task
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

mod session;

pub mod hub;
pub mod messages;
pub mod state;

pub use hub::ChatHub;

/// Handle WebSocket upgrade for the `/ws/chat` endpoint.
#[get("/ws/chat")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(origin_header, &state.allowed_origins)?;

    let peer_ip = req
        .peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string());
    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;

    actix_web::rt::spawn(session::handle_ws_session(
        state.chat.clone(),
        state.hub.clone(),
        peer_ip,
        session,
        messages,
    ));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, allowed: &[Url]) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, allowed) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

/// Returns true when scheme, host and port match an allow-list entry.
fn is_allowed_origin(origin: &Url, allowed: &[Url]) -> bool {
    let origin = origin.origin();
    origin.is_tuple() && allowed.iter().any(|entry| entry.origin() == origin)
}

/// Parse a comma-separated allow-list, skipping blank entries.
///
/// # Errors
///
/// Returns the first entry that is not an absolute URL.
///
/// # Examples
/// ```
/// use backend::inbound::ws::parse_allowed_origins;
///
/// let origins = parse_allowed_origins("http://localhost:3000, https://app.example").unwrap();
/// assert_eq!(origins.len(), 2);
/// ```
pub fn parse_allowed_origins(raw: &str) -> Result<Vec<Url>, url::ParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Url::parse)
        .collect()
}
