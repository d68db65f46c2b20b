//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST handler of the inbound HTTP adapter plus
//! the health probes. Schemas reachable from request and response bodies are
//! registered by utoipa automatically; the error envelope is listed
//! explicitly so clients always see it.
//!
//! The document backs Swagger UI (debug builds) and the `openapi-dump`
//! binary.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Community backend API",
        description = "Residential community management: membership, incidents, \
complaints, documents, bulletin board, zone reservations, polls and chat."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        http::auth::register_president,
        http::auth::register_user,
        http::auth::login,
        http::auth::logout,
        http::auth::me,
        http::auth::session_status,
        http::profile::get_profile,
        http::profile::change_password,
        http::community::get_community,
        http::community::change_community,
        http::community::cede_presidency,
        http::community::list_members,
        http::incidents::create_incident,
        http::incidents::list_incidents,
        http::incidents::update_incident_state,
        http::incidents::delete_incident,
        http::incidents::download_incident_file,
        http::complaints::create_complaint,
        http::complaints::my_complaints,
        http::complaints::community_complaints,
        http::complaints::reply_complaint,
        http::complaints::delete_complaint,
        http::complaints::download_complaint_file,
        http::documents::publish_document,
        http::documents::list_documents,
        http::documents::delete_document,
        http::documents::download_document_file,
        http::posts::create_post,
        http::posts::list_posts,
        http::posts::delete_post,
        http::zones::create_zone,
        http::zones::list_zones,
        http::zones::delete_zone,
        http::reservations::create_reservation,
        http::reservations::cancel_reservation,
        http::reservations::zone_reservations,
        http::reservations::reservation_history,
        http::reservations::my_reservations,
        http::reservations::reservation_calendar,
        http::reservations::community_reservations,
        http::reservations::reservation_slots,
        http::polls::create_poll,
        http::polls::cast_vote,
        http::polls::active_polls,
        http::polls::closed_polls,
        http::polls::delete_poll,
        http::chat::chat_history,
        http::chat::chat_stats,
        http::chat::delete_chat_message,
        http::chat::chat_status,
        http::health::ready,
        http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "profile", description = "The session user's own account"),
        (name = "community", description = "Community membership and presidency"),
        (name = "incidents", description = "Maintenance incidents"),
        (name = "complaints", description = "Complaints and board replies"),
        (name = "documents", description = "Published community documents"),
        (name = "posts", description = "Bulletin board"),
        (name = "zones", description = "Bookable common zones"),
        (name = "reservations", description = "Zone reservations"),
        (name = "polls", description = "Polls and votes"),
        (name = "chat", description = "Chat history and moderation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
