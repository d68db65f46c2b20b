//! Internal Diesel row types.
//!
//! Rows mirror `schema.rs` and never leave the persistence module; the
//! repositories convert them into validated domain values.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    chat_messages, communities, complaints, documents, incidents, polls, posts, reservations,
    users, votes, zones,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = communities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommunityRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub code: String,
    pub president_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub dni: String,
    pub full_name: String,
    pub floor: String,
    pub password_hash: String,
    pub role: String,
    pub community_id: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub dni: &'a str,
    pub full_name: &'a str,
    pub floor: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub community_id: Option<Uuid>,
}

/// Mutable account columns. `None` clears the community.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub full_name: &'a str,
    pub floor: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub community_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IncidentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub state: String,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incidents)]
pub(crate) struct NewIncidentRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub state: &'a str,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ComplaintRow {
    pub id: Uuid,
    pub content: String,
    pub anonymous: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = complaints)]
pub(crate) struct NewComplaintRow<'a> {
    pub id: Uuid,
    pub content: &'a str,
    pub anonymous: bool,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub response: Option<&'a str>,
    pub responded_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub comment: Option<String>,
    pub doc_type: String,
    pub published_at: DateTime<Utc>,
    pub file_names: Vec<String>,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub id: Uuid,
    pub comment: Option<&'a str>,
    pub doc_type: &'a str,
    pub published_at: DateTime<Utc>,
    pub file_names: Vec<String>,
    pub author_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub community_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: Uuid,
    pub community_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = zones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ZoneRow {
    pub id: Uuid,
    pub name: String,
    pub community_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// State columns touched by a cancellation.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = reservations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReservationStateChangeset<'a> {
    pub state: &'a str,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PollRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub created_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = polls)]
pub(crate) struct NewPollRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub option1: &'a str,
    pub option2: &'a str,
    pub option3: &'a str,
    pub created_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub community_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Uuid,
    pub option: String,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatMessageRow {
    pub id: Uuid,
    pub content: String,
    pub sender_name: String,
    pub origin_ip: String,
    pub sent_at: DateTime<Utc>,
}
