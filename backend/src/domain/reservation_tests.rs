//! Tests for reservation scheduling rules.

use super::*;
use crate::domain::{CommunityId, Dni, Email, Floor, FullName, PasswordHash};
use rstest::{fixture, rstest};

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
}

fn range(start: u32, end: u32) -> TimeRange {
    TimeRange::try_new(time(start, 0), time(end, 0)).expect("valid range")
}

fn reservation(day: u32, start: u32, end: u32, state: ReservationState) -> Reservation {
    Reservation {
        id: ReservationId::random(),
        zone_id: ZoneId::random(),
        user_id: UserId::random(),
        date: date(day),
        start: time(start, 0),
        end: time(end, 0),
        state,
        created_at: date(1).and_time(time(9, 0)).and_utc(),
        cancelled_at: None,
    }
}

fn user(role: Role) -> User {
    User {
        id: UserId::random(),
        email: Email::new("ana@example.org").expect("email"),
        dni: Dni::new("12345678Z").expect("dni"),
        full_name: FullName::new("Ana").expect("name"),
        floor: Floor::new("1A").expect("floor"),
        password_hash: PasswordHash::new("hash"),
        role,
        community_id: Some(CommunityId::random()),
    }
}

#[fixture]
fn now() -> NaiveDateTime {
    date(10).and_time(time(11, 30))
}

#[rstest]
#[case(8, 10, false)]
#[case(12, 14, false)]
#[case(9, 11, true)]
#[case(11, 13, true)]
#[case(10, 12, true)]
#[case(9, 13, true)]
fn detects_half_open_overlap(#[case] start: u32, #[case] end: u32, #[case] conflicts: bool) {
    let existing = vec![reservation(12, 10, 12, ReservationState::Active)];
    assert_eq!(find_conflict(&existing, &range(start, end)).is_some(), conflicts);
}

#[rstest]
fn cancelled_reservations_do_not_conflict() {
    let existing = vec![reservation(12, 10, 12, ReservationState::Cancelled)];
    assert!(find_conflict(&existing, &range(10, 12)).is_none());
}

#[rstest]
fn range_requires_end_after_start() {
    assert!(TimeRange::try_new(time(10, 0), time(10, 0)).is_err());
    assert!(TimeRange::try_new(time(11, 0), time(10, 0)).is_err());
}

#[rstest]
fn rejects_past_dates(now: NaiveDateTime) {
    let error = validate_schedule(date(9), &range(12, 14), now).expect_err("past date");
    assert_eq!(error.message(), "reservations cannot be made for past dates");
}

#[rstest]
fn rejects_past_start_today(now: NaiveDateTime) {
    assert!(validate_schedule(date(10), &range(10, 12), now).is_err());
    assert!(validate_schedule(date(10), &range(12, 14), now).is_ok());
}

#[rstest]
fn accepts_future_dates_at_any_hour(now: NaiveDateTime) {
    assert!(validate_schedule(date(11), &range(8, 10), now).is_ok());
}

#[rstest]
#[case::free(None, 0, None, true)]
#[case::zone_day_taken(None, 1, None, false)]
#[case::uncapped_by_default(None, 0, Some(5), true)]
#[case::below_cap(Some(2), 0, Some(1), true)]
#[case::cap_reached(Some(2), 0, Some(2), false)]
fn enforces_quotas(
    #[case] cap: Option<u32>,
    #[case] same_zone: u64,
    #[case] upcoming: Option<u64>,
    #[case] allowed: bool,
) {
    let limits = ReservationLimits {
        per_user_upcoming: cap,
        ..ReservationLimits::default()
    };
    assert_eq!(limits.check(same_zone, upcoming).is_ok(), allowed);
}

#[rstest]
fn slot_ranges_cover_opening_hours() {
    let starts: Vec<_> = slot_ranges().iter().map(TimeRange::start).collect();
    let expected: Vec<_> = [8, 10, 12, 14, 16, 18, 20].map(|h| time(h, 0)).to_vec();
    assert_eq!(starts, expected);
    assert_eq!(slot_ranges().last().map(TimeRange::end), Some(time(22, 0)));
}

#[rstest]
fn marks_slots_on_today(now: NaiveDateTime) {
    let existing = vec![reservation(10, 14, 16, ReservationState::Active)];
    let slots = day_slots(date(10), &existing, now);
    let reasons: Vec<_> = slots.iter().map(|slot| slot.unavailable).collect();
    assert_eq!(
        reasons,
        vec![
            Some(SlotUnavailable::TimePassed),
            Some(SlotUnavailable::TimePassed),
            None,
            Some(SlotUnavailable::AlreadyReserved),
            None,
            None,
            None,
        ]
    );
}

#[rstest]
fn past_dates_close_every_free_slot(now: NaiveDateTime) {
    let slots = day_slots(date(3), &[], now);
    assert!(slots
        .iter()
        .all(|slot| slot.unavailable == Some(SlotUnavailable::DatePassed)));
}

#[rstest]
fn free_start_times_skip_partially_booked_slots() {
    let existing = vec![reservation(12, 9, 11, ReservationState::Active)];
    let free = free_start_times(&existing);
    assert!(!free.contains(&time(8, 0)));
    assert!(!free.contains(&time(10, 0)));
    assert!(free.contains(&time(12, 0)));
}

#[rstest]
fn timing_reports_progress(now: NaiveDateTime) {
    let upcoming = reservation(10, 16, 18, ReservationState::Active);
    let timing = upcoming.timing(now);
    assert!(!timing.started);
    assert!(timing.can_cancel);
    assert_eq!(timing.hours_until_start, 4);

    let running = reservation(10, 10, 12, ReservationState::Active);
    let timing = running.timing(now);
    assert!(timing.started);
    assert!(!timing.finished);
    assert!(!timing.can_cancel);
    assert_eq!(timing.hours_until_start, 0);
}

#[rstest]
fn cancel_requires_owner(now: NaiveDateTime) {
    let mut booking = reservation(12, 10, 12, ReservationState::Active);
    let error = booking
        .cancel(UserId::random(), now.and_utc())
        .expect_err("not owner");
    assert_eq!(error.code(), crate::domain::ErrorCode::Forbidden);
}

#[rstest]
fn cancel_rejects_started_reservations(now: NaiveDateTime) {
    let mut booking = reservation(10, 10, 12, ReservationState::Active);
    let owner = booking.user_id;
    assert!(booking.cancel(owner, now.and_utc()).is_err());
}

#[rstest]
fn cancel_marks_state_and_timestamp(now: NaiveDateTime) {
    let mut booking = reservation(12, 10, 12, ReservationState::Active);
    let owner = booking.user_id;
    booking.cancel(owner, now.and_utc()).expect("cancellable");
    assert_eq!(booking.state, ReservationState::Cancelled);
    assert_eq!(booking.cancelled_at, Some(now.and_utc()));
    assert!(booking.cancel(owner, now.and_utc()).is_err());
}

#[rstest]
#[case(Role::President, false, true)]
#[case(Role::Resident, true, true)]
#[case(Role::Resident, false, false)]
#[case(Role::Administrator, false, false)]
fn owner_visibility(#[case] role: Role, #[case] is_owner: bool, #[case] visible: bool) {
    let viewer = user(role);
    let owner = if is_owner { viewer.id } else { UserId::random() };
    assert_eq!(owner_visible_to(&viewer, owner), visible);
}
