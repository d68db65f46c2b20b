//! Reservation scheduling rules for common zones.
//!
//! Reservations are half-open intervals `[start, end)` on a single date. The
//! functions here are pure: callers pass the community clock reading so the
//! rules can be exercised with fixed instants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Error, ReservationId, Role, User, UserId, ZoneId};

/// First bookable hour of the day.
pub const OPENING_HOUR: u32 = 8;
/// Hour at which the last slot ends.
pub const CLOSING_HOUR: u32 = 22;
/// Length of one bookable slot in hours.
pub const SLOT_HOURS: u32 = 2;
/// Owner label shown to users who may not see who booked a slot.
pub const HIDDEN_OWNER: &str = "Reserved";

/// Whether a reservation still holds its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Active,
    Cancelled,
}

impl ReservationState {
    /// Storage and wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown reservation state: {other}")),
        }
    }
}

/// Time window within one day, with `end` strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Validate that `end` follows `start`.
    pub fn try_new(start: NaiveTime, end: NaiveTime) -> Result<Self, Error> {
        if end <= start {
            return Err(Error::invalid_field(
                "end",
                "not_after_start",
                "end time must be after start time",
            ));
        }
        Ok(Self { start, end })
    }

    /// Inclusive start.
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Half-open overlap: touching ranges do not collide.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::TimeRange;
    /// use chrono::NaiveTime;
    ///
    /// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    /// let morning = TimeRange::try_new(at(8), at(10)).unwrap();
    /// let late_morning = TimeRange::try_new(at(10), at(12)).unwrap();
    /// let overlap = TimeRange::try_new(at(9), at(11)).unwrap();
    /// assert!(!morning.overlaps(&late_morning));
    /// assert!(morning.overlaps(&overlap));
    /// ```
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Booking of a common zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub zone_id: ZoneId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub state: ReservationState,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Time window covered by the reservation.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }

    /// Whether the reservation still holds its slot.
    pub fn is_active(&self) -> bool {
        self.state == ReservationState::Active
    }

    /// Local instant the reservation starts.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    /// Local instant the reservation ends.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }

    /// Active and not started yet.
    pub fn is_cancellable(&self, now: NaiveDateTime) -> bool {
        self.is_active() && self.starts_at() > now
    }

    /// Cancel on behalf of `actor`, stamping `cancelled_at`.
    pub fn cancel(&mut self, actor: UserId, now: DateTime<Utc>) -> Result<(), Error> {
        if self.user_id != actor {
            return Err(Error::forbidden("only the owner can cancel a reservation"));
        }
        if self.starts_at() <= now.naive_utc() {
            return Err(Error::invalid_request(
                "a reservation that has already started cannot be cancelled",
            ));
        }
        if !self.is_active() {
            return Err(Error::invalid_request("the reservation is already cancelled"));
        }
        self.state = ReservationState::Cancelled;
        self.cancelled_at = Some(now);
        Ok(())
    }

    /// Progress flags relative to `now`.
    pub fn timing(&self, now: NaiveDateTime) -> ReservationTiming {
        let starts_at = self.starts_at();
        let hours_until_start = if starts_at > now {
            (starts_at - now).num_hours()
        } else {
            0
        };
        ReservationTiming {
            started: starts_at <= now,
            finished: self.ends_at() <= now,
            can_cancel: self.is_cancellable(now),
            hours_until_start,
        }
    }
}

/// Where a reservation stands relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationTiming {
    pub started: bool,
    pub finished: bool,
    pub can_cancel: bool,
    pub hours_until_start: i64,
}

/// Check the requested date and window are not in the past.
pub fn validate_schedule(
    date: NaiveDate,
    range: &TimeRange,
    now: NaiveDateTime,
) -> Result<(), Error> {
    let today = now.date();
    if date < today {
        return Err(Error::invalid_request("reservations cannot be made for past dates"));
    }
    if date == today && range.start() < now.time() {
        return Err(Error::invalid_request("reservations cannot start in the past"));
    }
    Ok(())
}

/// First ACTIVE reservation colliding with `range`, if any.
pub fn find_conflict<'a>(
    existing: &'a [Reservation],
    range: &TimeRange,
) -> Option<&'a Reservation> {
    existing
        .iter()
        .filter(|reservation| reservation.is_active())
        .find(|reservation| reservation.range().overlaps(range))
}

/// Configurable reservation quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationLimits {
    /// Active reservations allowed per user, zone and date.
    pub per_zone_and_day: u32,
    /// Upcoming active reservations allowed per user across all zones.
    /// Uncapped unless configured.
    pub per_user_upcoming: Option<u32>,
}

impl Default for ReservationLimits {
    fn default() -> Self {
        Self {
            per_zone_and_day: 1,
            per_user_upcoming: None,
        }
    }
}

impl ReservationLimits {
    /// Reject the booking when a quota is already used up. `upcoming` is only
    /// consulted when a per-user cap is configured.
    pub fn check(&self, same_zone_and_day: u64, upcoming: Option<u64>) -> Result<(), Error> {
        if same_zone_and_day >= u64::from(self.per_zone_and_day) {
            return Err(Error::invalid_request(format!(
                "reservation limit for this zone and date reached ({})",
                self.per_zone_and_day
            )));
        }
        match (self.per_user_upcoming, upcoming) {
            (Some(cap), Some(count)) if count >= u64::from(cap) => {
                Err(Error::invalid_request(format!(
                    "limit of upcoming active reservations reached ({cap})"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Why a slot cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUnavailable {
    AlreadyReserved,
    TimePassed,
    DatePassed,
}

impl SlotUnavailable {
    /// Human-readable reason.
    pub const fn label(self) -> &'static str {
        match self {
            Self::AlreadyReserved => "Already reserved",
            Self::TimePassed => "Time passed",
            Self::DatePassed => "Date passed",
        }
    }
}

/// One fixed two-hour window of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub range: TimeRange,
    pub unavailable: Option<SlotUnavailable>,
}

impl Slot {
    /// Whether the slot can still be booked.
    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }
}

/// Fixed daily windows 08-10 through 20-22.
pub fn slot_ranges() -> Vec<TimeRange> {
    (OPENING_HOUR..CLOSING_HOUR)
        .step_by(SLOT_HOURS as usize)
        .filter_map(|hour| {
            let start = NaiveTime::from_hms_opt(hour, 0, 0)?;
            let end = NaiveTime::from_hms_opt(hour + SLOT_HOURS, 0, 0)?;
            Some(TimeRange { start, end })
        })
        .collect()
}

/// Availability of every slot on `date`.
///
/// A slot overlapping an active reservation is reserved; otherwise slots
/// already begun today or on past dates are closed.
pub fn day_slots(date: NaiveDate, existing: &[Reservation], now: NaiveDateTime) -> Vec<Slot> {
    let today = now.date();
    slot_ranges()
        .into_iter()
        .map(|range| {
            let unavailable = if find_conflict(existing, &range).is_some() {
                Some(SlotUnavailable::AlreadyReserved)
            } else if date == today && range.start() < now.time() {
                Some(SlotUnavailable::TimePassed)
            } else if date < today {
                Some(SlotUnavailable::DatePassed)
            } else {
                None
            };
            Slot { range, unavailable }
        })
        .collect()
}

/// Slot start times not covered by an active reservation.
pub fn free_start_times(existing: &[Reservation]) -> Vec<NaiveTime> {
    slot_ranges()
        .into_iter()
        .filter(|range| find_conflict(existing, range).is_none())
        .map(|range| range.start())
        .collect()
}

/// Whether `viewer` may see who owns a reservation.
pub fn owner_visible_to(viewer: &User, owner: UserId) -> bool {
    viewer.role == Role::President || viewer.id == owner
}

/// Reservation joined with its zone and owner details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationView {
    pub reservation: Reservation,
    pub zone_name: String,
    pub user_name: String,
    pub user_email: String,
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
