//! Reservation handlers.
//!
//! Dates travel as `YYYY-MM-DD` and times as `HH:MM`. Owner name and email
//! are masked for viewers other than the owner and the president.
//!
//! ```text
//! POST   /api/v1/reservations {"zoneId":"…","date":"2025-03-12","start":"10:00","end":"12:00"}
//! DELETE /api/v1/reservations/{id}
//! GET    /api/v1/reservations/zone/{zoneId}
//! GET    /api/v1/reservations/history?zoneId=&from=&to=
//! GET    /api/v1/reservations/mine
//! GET    /api/v1/reservations/calendar?zoneId=&date=
//! GET    /api/v1/reservations/community?from=&to=
//! GET    /api/v1/reservations/slots?zoneId=&date=
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::HistoryFilter;
use crate::domain::{
    CalendarDay, DaySlots, Error, ReservationEntry, ReservationId, ReservationRequest,
    ReservationState, Slot, ZoneId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, format_time, parse_date, parse_id, parse_optional_date, parse_time,
};

const ZONE_ID: FieldName = FieldName::new("zoneId");

/// Body for `POST /api/v1/reservations`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub zone_id: String,
    #[schema(example = "2025-03-12")]
    pub date: String,
    #[schema(example = "10:00")]
    pub start: String,
    #[schema(example = "12:00")]
    pub end: String,
}

impl TryFrom<CreateReservationRequest> for ReservationRequest {
    type Error = Error;

    fn try_from(value: CreateReservationRequest) -> Result<Self, Self::Error> {
        Self::try_new(
            parse_id(&value.zone_id, ZONE_ID)?,
            parse_date(&value.date, FieldName::new("date"))?,
            parse_time(&value.start, FieldName::new("start"))?,
            parse_time(&value.end, FieldName::new("end"))?,
        )
    }
}

/// `?zoneId=&date=` parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ZoneDayQuery {
    pub zone_id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

impl ZoneDayQuery {
    fn parse(&self) -> Result<(ZoneId, NaiveDate), Error> {
        Ok((
            parse_id(&self.zone_id, ZONE_ID)?,
            parse_date(&self.date, FieldName::new("date"))?,
        ))
    }
}

/// `?from=&to=` parameters, optionally narrowed to one zone.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    pub zone_id: Option<String>,
    /// `YYYY-MM-DD`.
    pub from: Option<String>,
    /// `YYYY-MM-DD`.
    pub to: Option<String>,
}

impl DateRangeQuery {
    fn dates(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), Error> {
        Ok((
            parse_optional_date(self.from.as_deref(), FieldName::new("from"))?,
            parse_optional_date(self.to.as_deref(), FieldName::new("to"))?,
        ))
    }

    fn history_filter(&self) -> Result<HistoryFilter, Error> {
        let zone = self
            .zone_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id(raw, ZONE_ID))
            .transpose()?;
        let (from, to) = self.dates()?;
        Ok(HistoryFilter { zone, from, to })
    }
}

/// Reservation as shown to the session user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: ReservationId,
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub date: NaiveDate,
    #[schema(example = "10:00")]
    pub start: String,
    #[schema(example = "12:00")]
    pub end: String,
    pub state: ReservationState,
    /// Owner name, or `Reserved` when hidden from the viewer.
    pub user_name: String,
    pub user_email: Option<String>,
    pub own: bool,
    pub started: bool,
    pub finished: bool,
    pub can_cancel: bool,
    pub hours_until_start: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationEntry> for ReservationDto {
    fn from(entry: ReservationEntry) -> Self {
        let can_cancel = entry.can_cancel();
        let ReservationEntry {
            reservation,
            zone_name,
            owner_name,
            owner_email,
            own,
            timing,
        } = entry;
        Self {
            id: reservation.id,
            zone_id: reservation.zone_id,
            zone_name,
            date: reservation.date,
            start: format_time(reservation.start),
            end: format_time(reservation.end),
            state: reservation.state,
            user_name: owner_name,
            user_email: owner_email,
            own,
            started: timing.started,
            finished: timing.finished,
            can_cancel,
            hours_until_start: timing.hours_until_start,
            created_at: reservation.created_at,
        }
    }
}

fn dtos(entries: Vec<ReservationEntry>) -> Vec<ReservationDto> {
    entries.into_iter().map(ReservationDto::from).collect()
}

/// Bookings of one zone on one date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDto {
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub date: NaiveDate,
    pub reservations: Vec<ReservationDto>,
    /// Slot start times still free, `HH:MM`.
    pub free_start_times: Vec<String>,
}

impl From<CalendarDay> for CalendarDto {
    fn from(day: CalendarDay) -> Self {
        Self {
            zone_id: day.zone.id,
            zone_name: day.zone.name,
            date: day.date,
            reservations: dtos(day.reservations),
            free_start_times: day.free_start_times.into_iter().map(format_time).collect(),
        }
    }
}

/// One fixed two-hour slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotDto {
    pub start: String,
    pub end: String,
    pub available: bool,
    /// `Already reserved`, `Time passed` or `Date passed`.
    pub reason: Option<String>,
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            start: format_time(slot.range.start()),
            end: format_time(slot.range.end()),
            available: slot.is_available(),
            reason: slot.unavailable.map(|why| why.label().to_owned()),
        }
    }
}

/// Slot availability of one zone on one date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsDto {
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub date: NaiveDate,
    pub slots: Vec<SlotDto>,
}

impl From<DaySlots> for DaySlotsDto {
    fn from(day: DaySlots) -> Self {
        Self {
            zone_id: day.zone.id,
            zone_name: day.zone.name,
            date: day.date,
            slots: day.slots.into_iter().map(SlotDto::from).collect(),
        }
    }
}

/// Book a zone.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDto),
        (status = 400, description = "Rule violated", body = Error),
        (status = 403, description = "Residents and president only", body = Error),
        (status = 404, description = "Unknown zone", body = Error),
        (status = 409, description = "Slot taken concurrently", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "createReservation"
)]
#[post("/reservations")]
pub async fn create_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReservationRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = ReservationRequest::try_from(payload.into_inner())?;
    let entry = state.reservations.create(&user_id, request).await?;
    Ok(HttpResponse::Created().json(ReservationDto::from(entry)))
}

/// Cancel one of the session user's reservations.
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    params(("id" = String, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 400, description = "Already started or cancelled", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown reservation", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "cancelReservation"
)]
#[delete("/reservations/{id}")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: ReservationId = parse_id(&path, FieldName::new("id"))?;
    state.reservations.cancel(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/zone/{zoneId}",
    params(("zoneId" = String, Path, description = "Zone id")),
    responses(
        (status = 200, description = "Active reservations by date and start", body = [ReservationDto]),
        (status = 404, description = "Unknown zone", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "zoneReservations"
)]
#[get("/reservations/zone/{zone_id}")]
pub async fn zone_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ReservationDto>>> {
    let user_id = session.require_user_id()?;
    let zone_id: ZoneId = parse_id(&path, ZONE_ID)?;
    let entries = state.reservations.active_by_zone(&user_id, &zone_id).await?;
    Ok(web::Json(dtos(entries)))
}

/// Full booking history of the community. President only.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/history",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Reservations, newest first", body = [ReservationDto]),
        (status = 403, description = "President only", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "reservationHistory"
)]
#[get("/reservations/history")]
pub async fn reservation_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<web::Json<Vec<ReservationDto>>> {
    let user_id = session.require_user_id()?;
    let filter = query.history_filter()?;
    let entries = state.reservations.history(&user_id, filter).await?;
    Ok(web::Json(dtos(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    responses((status = 200, description = "Own reservations", body = [ReservationDto])),
    tags = ["reservations"],
    operation_id = "myReservations"
)]
#[get("/reservations/mine")]
pub async fn my_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReservationDto>>> {
    let user_id = session.require_user_id()?;
    let entries = state.reservations.mine(&user_id).await?;
    Ok(web::Json(dtos(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/calendar",
    params(ZoneDayQuery),
    responses(
        (status = 200, description = "Bookings and free starts", body = CalendarDto),
        (status = 404, description = "Unknown zone", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "reservationCalendar"
)]
#[get("/reservations/calendar")]
pub async fn reservation_calendar(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ZoneDayQuery>,
) -> ApiResult<web::Json<CalendarDto>> {
    let user_id = session.require_user_id()?;
    let (zone_id, date) = query.parse()?;
    let day = state.reservations.calendar(&user_id, &zone_id, date).await?;
    Ok(web::Json(day.into()))
}

/// Active bookings across the community; defaults to the coming week.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/community",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Community reservations", body = [ReservationDto]),
        (status = 400, description = "Invalid range", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "communityReservations"
)]
#[get("/reservations/community")]
pub async fn community_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<web::Json<Vec<ReservationDto>>> {
    let user_id = session.require_user_id()?;
    let (from, to) = query.dates()?;
    let entries = state.reservations.community(&user_id, from, to).await?;
    Ok(web::Json(dtos(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/slots",
    params(ZoneDayQuery),
    responses(
        (status = 200, description = "Slot availability", body = DaySlotsDto),
        (status = 404, description = "Unknown zone", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "reservationSlots"
)]
#[get("/reservations/slots")]
pub async fn reservation_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ZoneDayQuery>,
) -> ApiResult<web::Json<DaySlotsDto>> {
    let user_id = session.require_user_id()?;
    let (zone_id, date) = query.parse()?;
    let slots = state.reservations.slots(&user_id, &zone_id, date).await?;
    Ok(web::Json(slots.into()))
}

#[cfg(test)]
#[path = "reservations_tests.rs"]
mod tests;
