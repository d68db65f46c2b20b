//! Domain primitives, business rules and services.
//!
//! Purpose: define strongly typed entities for the community backend and
//! the services that enforce its rules. Services depend only on the ports
//! in [`ports`]; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Entities: User, Community, Incident, Complaint, Document, Post,
//!   CommonZone, Reservation, Poll, Vote, ChatMessage.
//! - Services: one per feature, e.g. `ReservationService`.

mod actor;
mod attachment;
pub mod auth;
mod auth_service;
mod chat;
mod chat_service;
mod community;
mod community_service;
mod complaint;
mod complaint_service;
mod document;
mod document_service;
pub mod error;
mod ids;
mod incident;
mod incident_service;
mod pagination;
mod poll;
pub mod ports;
mod post;
mod post_service;
mod profile_service;
mod reservation;
mod reservation_service;
mod text;
mod trace_id;
mod upload;
pub mod user;
mod voting_service;
mod zone;
mod zone_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::actor::ActorLoader;
pub(crate) use self::actor::{require_community, require_role, require_same_community};
pub use self::attachment::{Attachment, FileCategory, StoredFileName, image_extensions};
pub use self::auth::{
    AccountDraft, AuthValidationError, LoginCredentials, PASSWORD_MIN, Password,
    PresidentRegistration, ResidentRegistration,
};
pub use self::auth_service::{AuthService, CurrentUser};
pub use self::chat::{
    ChatDraft, ChatMessage, DEFAULT_SENDER, HISTORY_ON_CONNECT, MAX_HISTORY, SYSTEM_SENDER,
    history_limit,
};
pub use self::chat_service::{ChatService, ChatStats};
pub use self::community::{Community, CommunityCode, CommunityValidationError, NewCommunity};
pub use self::community_service::{
    CommunityOverview, CommunityService, NOT_ASSIGNED, ResidentSummary,
};
pub use self::complaint::{
    ANONYMOUS_AUTHOR, Complaint, ComplaintContent, ComplaintView, complaint_response,
};
pub use self::complaint_service::ComplaintService;
pub use self::document::{
    Document, DocumentType, DocumentView, PublicationFilter, document_comment,
};
pub use self::document_service::{DocumentListItem, DocumentService};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{
    ChatMessageId, CommunityId, ComplaintId, DocumentId, IncidentId, PollId, PostId,
    ReservationId, UserId, VoteId, ZoneId,
};
pub use self::incident::{
    DESCRIPTION_MAX, Incident, IncidentDraft, IncidentSortField, IncidentState, IncidentView,
};
pub use self::incident_service::IncidentService;
pub use self::pagination::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, PageValidationError, SortDirection,
};
pub use self::poll::{MAX_DURATION_HOURS, Poll, PollDraft, PollView, Vote};
pub use self::post::{Post, PostDraft, PostView};
pub use self::post_service::PostService;
pub use self::profile_service::{PasswordChange, ProfileService};
pub use self::reservation::{
    CLOSING_HOUR, HIDDEN_OWNER, OPENING_HOUR, Reservation, ReservationLimits, ReservationState,
    ReservationTiming, ReservationView, SLOT_HOURS, Slot, SlotUnavailable, TimeRange, day_slots,
    find_conflict, free_start_times, owner_visible_to, slot_ranges, validate_schedule,
};
pub use self::reservation_service::{
    CalendarDay, DaySlots, ReservationEntry, ReservationRequest, ReservationService,
};
pub use self::text::{optional_text, required_text};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{UploadPolicy, Uploader};
pub use self::user::{
    Dni, Email, Floor, FullName, PasswordHash, Role, RoleParseError, User, UserValidationError,
};
pub use self::voting_service::VotingService;
pub use self::zone::{CommonZone, zone_name};
pub use self::zone_service::{ZoneListItem, ZoneService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
