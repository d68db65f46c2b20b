//! Tests for reservation handlers. The world clock reads 2025-03-10 09:00.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::test_support::{FixtureClock, fixture_date};
use crate::domain::{ReservationLimits, Role};
use crate::inbound::http::state::HttpStateOptions;
use crate::inbound::http::test_utils::{TestWorld, login, send, test_app};

async fn create_zone(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    name: &str,
) -> String {
    let (status, zone) = send(
        app,
        TestRequest::post()
            .uri("/api/v1/zones")
            .cookie(cookie.clone())
            .set_json(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    zone["id"].as_str().expect("zone id").to_owned()
}

fn booking(zone: &str, date: &str, start: &str, end: &str) -> Value {
    json!({"zoneId": zone, "date": date, "start": start, "end": end})
}

async fn book(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    body: Value,
) -> (StatusCode, Value) {
    send(
        app,
        TestRequest::post()
            .uri("/api/v1/reservations")
            .cookie(cookie.clone())
            .set_json(body),
    )
    .await
}

#[actix_web::test]
async fn booking_reports_timing_flags() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let cookie = login(&app, &resident).await;

    let (status, created) = book(&app, &cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["start"], "10:00");
    assert_eq!(created["end"], "12:00");
    assert_eq!(created["zoneName"], "Pool");
    assert_eq!(created["own"], true);
    assert_eq!(created["canCancel"], true);
    assert_eq!(created["hoursUntilStart"], 49);

    let (status, mine) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/mine")
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["started"], false);
    assert_eq!(mine[0]["userName"], "Luis Gómez");
}

#[rstest]
#[case("11:00", "13:00", StatusCode::BAD_REQUEST)]
#[case("09:00", "11:00", StatusCode::BAD_REQUEST)]
#[case("12:00", "14:00", StatusCode::CREATED)]
#[case("08:00", "10:00", StatusCode::CREATED)]
#[actix_web::test]
async fn overlap_uses_half_open_windows(
    #[case] start: &str,
    #[case] end: &str,
    #[case] expected: StatusCode,
) {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let first = world.member(&community, Role::Resident, "First").await;
    let second = world.member(&community, Role::Resident, "Second").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let first_cookie = login(&app, &first).await;
    let (status, _) = book(&app, &first_cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let second_cookie = login(&app, &second).await;
    let (status, _) = book(&app, &second_cookie, booking(&zone, "2025-03-12", start, end)).await;
    assert_eq!(status, expected);
}

#[rstest]
#[case("2025-03-09", "10:00", "12:00")]
#[case("2025-03-10", "08:00", "10:00")]
#[case("2025-03-12", "12:00", "10:00")]
#[case("2025-03-12", "12:00", "12:00")]
#[case("12/03/2025", "10:00", "12:00")]
#[case("2025-03-12", "ten", "12:00")]
#[actix_web::test]
async fn invalid_schedules_are_rejected(#[case] date: &str, #[case] start: &str, #[case] end: &str) {
    let world = TestWorld::new();
    let (_, president) = world.community("SOL-01").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let cookie = login(&app, &president).await;
    let zone = create_zone(&app, &cookie, "Pool").await;

    let (status, _) = book(&app, &cookie, booking(&zone, date, start, end)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Books Pool on 03-12 and Gym on 03-13, then returns the third attempt.
async fn third_booking_in_the_week(world: TestWorld) -> (StatusCode, Value) {
    let (community, president) = world.community("SOL-01").await;
    let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let pool = create_zone(&app, &president_cookie, "Pool").await;
    let gym = create_zone(&app, &president_cookie, "Gym").await;
    let court = create_zone(&app, &president_cookie, "Court").await;
    let cookie = login(&app, &resident).await;

    let (status, _) = book(&app, &cookie, booking(&pool, "2025-03-12", "10:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = book(&app, &cookie, booking(&pool, "2025-03-12", "16:00", "18:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.contains("zone and date"))
    );
    let (status, _) = book(&app, &cookie, booking(&gym, "2025-03-13", "10:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    book(&app, &cookie, booking(&court, "2025-03-14", "10:00", "12:00")).await
}

#[actix_web::test]
async fn only_the_zone_and_date_quota_applies_by_default() {
    let (status, _) = third_booking_in_the_week(TestWorld::new()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn configured_upcoming_cap_blocks_further_bookings() {
    let options = HttpStateOptions {
        reservations: ReservationLimits {
            per_user_upcoming: Some(2),
            ..ReservationLimits::default()
        },
        ..HttpStateOptions::default()
    };
    let world = TestWorld::with_options(FixtureClock::at(fixture_date(), 9, 0), options);

    let (status, body) = third_booking_in_the_week(world).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("upcoming")));
}

#[actix_web::test]
async fn calendar_masks_owners_from_other_residents() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let owner = world.member(&community, Role::Resident, "Owner").await;
    let neighbour = world.member(&community, Role::Resident, "Neighbour").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let owner_cookie = login(&app, &owner).await;
    book(&app, &owner_cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;
    let uri = format!("/api/v1/reservations/calendar?zoneId={zone}&date=2025-03-12");

    let neighbour_cookie = login(&app, &neighbour).await;
    let (status, day) = send(&app, TestRequest::get().uri(&uri).cookie(neighbour_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["reservations"][0]["userName"], "Reserved");
    assert_eq!(day["reservations"][0]["userEmail"], Value::Null);
    assert_eq!(day["reservations"][0]["own"], false);
    assert_eq!(day["reservations"][0]["canCancel"], false);
    let free = day["freeStartTimes"].as_array().expect("free starts");
    assert_eq!(free.len(), 6);
    assert!(!free.contains(&json!("10:00")));

    let (_, day) = send(&app, TestRequest::get().uri(&uri).cookie(president_cookie)).await;
    assert_eq!(day["reservations"][0]["userName"], "Owner");
    assert_eq!(day["reservations"][0]["userEmail"], owner.email.as_ref());
}

#[actix_web::test]
async fn slots_explain_why_they_are_closed() {
    let world = TestWorld::new();
    let (_, president) = world.community("SOL-01").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let cookie = login(&app, &president).await;
    let zone = create_zone(&app, &cookie, "Pool").await;
    book(&app, &cookie, booking(&zone, "2025-03-10", "10:00", "12:00")).await;

    let (status, today) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/reservations/slots?zoneId={zone}&date=2025-03-10"))
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slots = today["slots"].as_array().expect("slots");
    assert_eq!(slots.len(), 7);
    assert_eq!(slots[0]["start"], "08:00");
    assert_eq!(slots[0]["reason"], "Time passed");
    assert_eq!(slots[1]["reason"], "Already reserved");
    assert_eq!(slots[2]["available"], true);
    assert_eq!(slots[6]["end"], "22:00");

    let (_, yesterday) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/reservations/slots?zoneId={zone}&date=2025-03-09"))
            .cookie(cookie),
    )
    .await;
    assert_eq!(yesterday["slots"][3]["reason"], "Date passed");
}

#[actix_web::test]
async fn owners_cancel_and_the_slot_frees_up() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let owner = world.member(&community, Role::Resident, "Owner").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let owner_cookie = login(&app, &owner).await;
    let (_, created) = book(&app, &owner_cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;
    let uri = format!("/api/v1/reservations/{}", created["id"].as_str().expect("id"));

    let (status, _) = send(
        &app,
        TestRequest::delete().uri(&uri).cookie(president_cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(owner_cookie.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(owner_cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = book(
        &app,
        &president_cookie,
        booking(&zone, "2025-03-12", "10:00", "12:00"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn history_is_for_the_president() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let pool = create_zone(&app, &president_cookie, "Pool").await;
    let gym = create_zone(&app, &president_cookie, "Gym").await;
    let cookie = login(&app, &resident).await;
    book(&app, &cookie, booking(&pool, "2025-03-12", "10:00", "12:00")).await;
    book(&app, &cookie, booking(&gym, "2025-03-14", "10:00", "12:00")).await;

    let (status, _) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/history")
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, all) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/history")
            .cookie(president_cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all[0]["date"], "2025-03-14");
    assert_eq!(all[1]["date"], "2025-03-12");

    let (_, filtered) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/reservations/history?zoneId={pool}&from=2025-03-11"))
            .cookie(president_cookie),
    )
    .await;
    assert_eq!(filtered.as_array().map(Vec::len), Some(1));
    assert_eq!(filtered[0]["zoneName"], "Pool");
}

#[actix_web::test]
async fn community_view_defaults_to_the_coming_week() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let cookie = login(&app, &resident).await;
    book(&app, &cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;
    book(&app, &president_cookie, booking(&zone, "2025-03-25", "10:00", "12:00")).await;

    let (status, week) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/community")
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/community?from=2025-03-20&to=2025-03-10")
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "to");
}

#[actix_web::test]
async fn community_window_at_the_calendar_edge_is_rejected() {
    let world = TestWorld::new();
    let (_, president) = world.community("SOL-01").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let cookie = login(&app, &president).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/reservations/community?from=%2B262142-12-30")
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "from");
}

#[actix_web::test]
async fn zone_listing_is_ordered_by_date_and_start() {
    let world = TestWorld::new();
    let (community, president) = world.community("SOL-01").await;
    let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
    let app = actix_test::init_service(test_app(world.state.clone())).await;
    let president_cookie = login(&app, &president).await;
    let zone = create_zone(&app, &president_cookie, "Pool").await;
    let cookie = login(&app, &resident).await;
    book(&app, &president_cookie, booking(&zone, "2025-03-12", "16:00", "18:00")).await;
    book(&app, &cookie, booking(&zone, "2025-03-12", "10:00", "12:00")).await;

    let (status, list) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/reservations/zone/{zone}"))
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["start"], "10:00");
    assert_eq!(list[1]["start"], "16:00");
    assert_eq!(list[1]["userName"], "Reserved");
}
