//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod chat;
pub mod community;
pub mod complaints;
pub mod documents;
pub mod error;
pub mod files;
pub mod health;
pub mod incidents;
pub mod pages;
pub mod polls;
pub mod posts;
pub mod profile;
pub mod reservations;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod zones;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments are registered ahead of `{id}` segments sharing a prefix.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register_president)
        .service(auth::register_user)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(auth::session_status)
        .service(profile::get_profile)
        .service(profile::change_password)
        .service(community::get_community)
        .service(community::change_community)
        .service(community::cede_presidency)
        .service(community::list_members)
        .service(incidents::download_incident_file)
        .service(incidents::create_incident)
        .service(incidents::list_incidents)
        .service(incidents::update_incident_state)
        .service(incidents::delete_incident)
        .service(complaints::download_complaint_file)
        .service(complaints::my_complaints)
        .service(complaints::create_complaint)
        .service(complaints::community_complaints)
        .service(complaints::reply_complaint)
        .service(complaints::delete_complaint)
        .service(documents::download_document_file)
        .service(documents::publish_document)
        .service(documents::list_documents)
        .service(documents::delete_document)
        .service(posts::create_post)
        .service(posts::list_posts)
        .service(posts::delete_post)
        .service(zones::create_zone)
        .service(zones::list_zones)
        .service(zones::delete_zone)
        .service(reservations::reservation_history)
        .service(reservations::my_reservations)
        .service(reservations::reservation_calendar)
        .service(reservations::community_reservations)
        .service(reservations::reservation_slots)
        .service(reservations::zone_reservations)
        .service(reservations::create_reservation)
        .service(reservations::cancel_reservation)
        .service(polls::active_polls)
        .service(polls::closed_polls)
        .service(polls::create_poll)
        .service(polls::cast_vote)
        .service(polls::delete_poll)
        .service(chat::chat_history)
        .service(chat::chat_stats)
        .service(chat::chat_status)
        .service(chat::delete_chat_message);
}
