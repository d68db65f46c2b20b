//! Booking common zones.
//!
//! Scheduling rules live in [`super::reservation`]; this service loads the
//! data they need, applies the configured quotas and shapes the per-viewer
//! output (owner masking, cancel flags).

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{HistoryFilter, ReservationRepository, UserRepository, ZoneRepository};
use super::{
    ActorLoader, CommonZone, Error, HIDDEN_OWNER, Reservation, ReservationId, ReservationLimits,
    ReservationState, ReservationTiming, ReservationView, Role, Slot, TimeRange, User, UserId,
    ZoneId, day_slots, find_conflict, free_start_times, owner_visible_to, require_community,
    require_role, validate_schedule,
};

const BOOKING_ROLES: &[Role] = &[Role::Resident, Role::President];
const COMMUNITY_WINDOW_DAYS: i64 = 7;

/// Validated booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationRequest {
    pub zone_id: ZoneId,
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl ReservationRequest {
    /// Pair a zone and date with a validated time window.
    pub fn try_new(
        zone_id: ZoneId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, Error> {
        Ok(Self {
            zone_id,
            date,
            range: TimeRange::try_new(start, end)?,
        })
    }
}

/// Reservation as shown to one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationEntry {
    pub reservation: Reservation,
    pub zone_name: String,
    /// Owner name, or [`HIDDEN_OWNER`] when the viewer may not see it.
    pub owner_name: String,
    pub owner_email: Option<String>,
    pub own: bool,
    pub timing: ReservationTiming,
}

impl ReservationEntry {
    fn for_viewer(viewer: &User, view: ReservationView, now: NaiveDateTime) -> Self {
        let ReservationView {
            reservation,
            zone_name,
            user_name,
            user_email,
        } = view;
        let own = reservation.user_id == viewer.id;
        let (owner_name, owner_email) = if owner_visible_to(viewer, reservation.user_id) {
            (user_name, Some(user_email))
        } else {
            (HIDDEN_OWNER.to_owned(), None)
        };
        let timing = reservation.timing(now);
        Self {
            reservation,
            zone_name,
            owner_name,
            owner_email,
            own,
            timing,
        }
    }

    /// Whether the viewer may cancel this reservation now.
    pub fn can_cancel(&self) -> bool {
        self.own && self.timing.can_cancel
    }
}

/// Active reservations of a zone on one date plus the free slot starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub zone: CommonZone,
    pub date: NaiveDate,
    pub reservations: Vec<ReservationEntry>,
    pub free_start_times: Vec<NaiveTime>,
}

/// Availability of every fixed slot of a zone on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySlots {
    pub zone: CommonZone,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// Reservation operations scoped to the actor's community.
#[derive(Clone)]
pub struct ReservationService {
    actors: ActorLoader,
    zones: Arc<dyn ZoneRepository>,
    reservations: Arc<dyn ReservationRepository>,
    limits: ReservationLimits,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    /// Assemble the service from its ports and quotas.
    pub fn new(
        users: Arc<dyn UserRepository>,
        zones: Arc<dyn ZoneRepository>,
        reservations: Arc<dyn ReservationRepository>,
        limits: ReservationLimits,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            zones,
            reservations,
            limits,
            clock,
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.utc().naive_utc()
    }

    /// Book a zone for the actor.
    pub async fn create(
        &self,
        actor: &UserId,
        request: ReservationRequest,
    ) -> Result<ReservationEntry, Error> {
        let actor = self.actors.load_with_role(actor, BOOKING_ROLES).await?;
        let zone = self.zone_of(&actor, &request.zone_id).await?;
        let now = self.now();
        validate_schedule(request.date, &request.range, now)?;

        let existing = self.reservations.active_on(&zone.id, request.date).await?;
        if let Some(conflict) = find_conflict(&existing, &request.range) {
            warn!(
                zone_id = %zone.id,
                conflicting = %conflict.id,
                "reservation overlaps an active booking"
            );
            return Err(Error::invalid_request(
                "the zone is already reserved at that time",
            ));
        }
        let same_zone_and_day = self
            .reservations
            .count_active_for_user_on(&actor.id, &zone.id, request.date)
            .await?;
        let upcoming = match self.limits.per_user_upcoming {
            Some(_) => Some(
                self.reservations
                    .count_upcoming_for_user(&actor.id, now)
                    .await?,
            ),
            None => None,
        };
        self.limits.check(same_zone_and_day, upcoming)?;

        let reservation = Reservation {
            id: ReservationId::random(),
            zone_id: zone.id,
            user_id: actor.id,
            date: request.date,
            start: request.range.start(),
            end: request.range.end(),
            state: ReservationState::Active,
            created_at: self.clock.utc(),
            cancelled_at: None,
        };
        self.reservations.insert(&reservation).await?;
        info!(
            reservation_id = %reservation.id,
            zone_id = %zone.id,
            date = %reservation.date,
            start = %reservation.start,
            "reservation created"
        );
        let view = ReservationView {
            reservation,
            zone_name: zone.name,
            user_name: actor.full_name.to_string(),
            user_email: actor.email.to_string(),
        };
        Ok(ReservationEntry::for_viewer(&actor, view, now))
    }

    /// Cancel one of the actor's reservations before it starts.
    pub async fn cancel(&self, actor: &UserId, id: &ReservationId) -> Result<Reservation, Error> {
        let actor = self.actors.load(actor).await?;
        let mut reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("reservation {id} not found")))?;
        reservation.cancel(actor.id, self.clock.utc())?;
        self.reservations.update(&reservation).await?;
        info!(reservation_id = %id, "reservation cancelled");
        Ok(reservation)
    }

    /// Active reservations of a zone ordered by date and start.
    pub async fn active_by_zone(
        &self,
        actor: &UserId,
        zone_id: &ZoneId,
    ) -> Result<Vec<ReservationEntry>, Error> {
        let actor = self.actors.load(actor).await?;
        let zone = self.zone_of(&actor, zone_id).await?;
        let views = self.reservations.active_for_zone(&zone.id).await?;
        Ok(self.entries(&actor, views))
    }

    /// Every reservation of the community, newest first. President only.
    pub async fn history(
        &self,
        actor: &UserId,
        filter: HistoryFilter,
    ) -> Result<Vec<ReservationEntry>, Error> {
        let actor = self.actors.load(actor).await?;
        require_role(&actor, &[Role::President])?;
        let community = require_community(&actor)?;
        let views = self.reservations.history(&community, filter).await?;
        Ok(self.entries(&actor, views))
    }

    /// The actor's own reservations, newest date first.
    pub async fn mine(&self, actor: &UserId) -> Result<Vec<ReservationEntry>, Error> {
        let actor = self.actors.load(actor).await?;
        let views = self.reservations.for_user(&actor.id).await?;
        Ok(self.entries(&actor, views))
    }

    /// Bookings of a zone on one date and the slot starts still free.
    pub async fn calendar(
        &self,
        actor: &UserId,
        zone_id: &ZoneId,
        date: NaiveDate,
    ) -> Result<CalendarDay, Error> {
        let actor = self.actors.load(actor).await?;
        let zone = self.zone_of(&actor, zone_id).await?;
        let views: Vec<ReservationView> = self
            .reservations
            .active_for_zone(&zone.id)
            .await?
            .into_iter()
            .filter(|view| view.reservation.date == date)
            .collect();
        let booked: Vec<Reservation> = views.iter().map(|view| view.reservation.clone()).collect();
        Ok(CalendarDay {
            free_start_times: free_start_times(&booked),
            reservations: self.entries(&actor, views),
            zone,
            date,
        })
    }

    /// Active reservations across the community between two dates.
    ///
    /// Defaults to today and the following seven days.
    pub async fn community(
        &self,
        actor: &UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ReservationEntry>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        let from = from.unwrap_or_else(|| self.now().date());
        let to = match to {
            Some(to) => to,
            None => from
                .checked_add_signed(Duration::days(COMMUNITY_WINDOW_DAYS))
                .ok_or_else(|| {
                    Error::invalid_field("from", "out_of_range", "start date is out of range")
                })?,
        };
        if to < from {
            return Err(Error::invalid_field(
                "to",
                "before_from",
                "end date must not precede start date",
            ));
        }
        let views = self
            .reservations
            .community_between(&community, from, to)
            .await?;
        Ok(self.entries(&actor, views))
    }

    /// Availability of every two-hour slot of a zone on one date.
    pub async fn slots(
        &self,
        actor: &UserId,
        zone_id: &ZoneId,
        date: NaiveDate,
    ) -> Result<DaySlots, Error> {
        let actor = self.actors.load(actor).await?;
        let zone = self.zone_of(&actor, zone_id).await?;
        let existing = self.reservations.active_on(&zone.id, date).await?;
        Ok(DaySlots {
            slots: day_slots(date, &existing, self.now()),
            zone,
            date,
        })
    }

    async fn zone_of(&self, actor: &User, zone_id: &ZoneId) -> Result<CommonZone, Error> {
        let community = require_community(actor)?;
        self.zones
            .find_in_community(zone_id, &community)
            .await?
            .ok_or_else(|| Error::not_found(format!("zone {zone_id} not found in your community")))
    }

    fn entries(&self, viewer: &User, views: Vec<ReservationView>) -> Vec<ReservationEntry> {
        let now = self.now();
        views
            .into_iter()
            .map(|view| ReservationEntry::for_viewer(viewer, view, now))
            .collect()
    }
}

#[cfg(test)]
#[path = "reservation_service_tests.rs"]
mod tests;
