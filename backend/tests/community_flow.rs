//! End-to-end community scenario over the public HTTP API.
//!
//! Wires the real services against the in-memory adapters and Argon2, then
//! walks a president and a neighbour through founding a community, booking a
//! zone and voting in a poll.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use backend::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use backend::inbound::http::{api_routes, error};
use backend::inbound::ws::ChatHub;
use backend::outbound::memory::{MemoryFileStorage, MemoryStore};
use backend::outbound::security::Argon2PasswordHasher;
use backend::Trace;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

/// Clock frozen at 2025-03-10 09:00 UTC.
struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[fixture]
fn state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    let instant = Utc
        .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
        .single()
        .expect("valid fixture instant");
    HttpState::new(
        HttpStatePorts {
            users: store.clone(),
            communities: store.clone(),
            incidents: store.clone(),
            complaints: store.clone(),
            documents: store.clone(),
            posts: store.clone(),
            zones: store.clone(),
            reservations: store.clone(),
            polls: store.clone(),
            chat: store,
            files: Arc::new(MemoryFileStorage::new()),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            clock: Arc::new(FrozenClock(instant)),
        },
        HttpStateOptions::default(),
        ChatHub::default(),
    )
}

async fn app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(error::json_config())
            .app_data(error::query_config())
            .app_data(error::path_config())
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(api_routes)),
    )
    .await
}

async fn call<S>(
    app: &S,
    req: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Option<Cookie<'static>>, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned());
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, cookie, json)
}

fn account(email: &str, dni: &str, name: &str) -> Value {
    json!({
        "email": email,
        "dni": dni,
        "fullName": name,
        "floor": "2B",
        "password": "secret1",
        "confirmPassword": "secret1",
    })
}

fn merged(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    base
}

#[rstest]
#[actix_web::test]
async fn neighbours_book_a_zone_and_vote(state: HttpState) {
    let app = app(state).await;

    let (status, president, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register-president")
            .set_json(merged(
                account("ana@example.org", "12345678Z", "Ana Ruiz"),
                json!({
                    "communityName": "Residencial Sol",
                    "communityAddress": "Calle Mayor 1",
                    "postalCode": "28001",
                    "communityCode": "SOL-01",
                }),
            )),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let president = president.expect("president session");

    let (status, _, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register-user")
            .set_json(merged(
                account("luis@example.org", "87654321X", "Luis Gil"),
                json!({ "communityCode": "SOL-01" }),
            )),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, resident, me) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "luis@example.org", "password": "secret1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {me}");
    let resident = resident.expect("resident session");

    let (status, _, zone) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/zones")
            .set_json(json!({ "name": "Pista de padel" })),
        Some(&president),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let zone_id = zone["id"].as_str().expect("zone id").to_owned();

    let booking = json!({
        "zoneId": zone_id,
        "date": "2025-03-11",
        "start": "10:00",
        "end": "12:00",
    });
    let (status, _, reservation) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/reservations")
            .set_json(booking.clone()),
        Some(&resident),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["own"], true);
    assert_eq!(reservation["state"], "active");

    let (status, _, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/reservations")
            .set_json(merged(booking, json!({ "start": "11:00", "end": "13:00" }))),
        Some(&president),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["traceId"].is_string());

    let (status, _, slots) = call(
        &app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/reservations/slots?zoneId={zone_id}&date=2025-03-11"
        )),
        Some(&president),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ten = slots["slots"]
        .as_array()
        .and_then(|slots| slots.iter().find(|slot| slot["start"] == "10:00"))
        .expect("10:00 slot");
    assert_eq!(ten["available"], false);

    let (status, _, poll) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/polls").set_json(json!({
            "title": "Pintar la fachada",
            "description": "Elegir color",
            "option1": "Blanco",
            "option2": "Crema",
            "option3": "Gris",
            "durationHours": 48,
        })),
        Some(&president),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let poll_id = poll["id"].as_str().expect("poll id").to_owned();

    let vote_uri = format!("/api/v1/polls/{poll_id}/votes");
    let (status, _, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&vote_uri)
            .set_json(json!({ "option": "Crema" })),
        Some(&resident),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&vote_uri)
            .set_json(json!({ "option": "Gris" })),
        Some(&resident),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, active) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/polls/active"),
        Some(&resident),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = active
        .as_array()
        .and_then(|polls| polls.first())
        .expect("one active poll");
    assert_eq!(listed["alreadyVoted"], true);
    let crema = listed["results"]
        .as_array()
        .and_then(|results| results.iter().find(|r| r["option"] == "Crema"))
        .expect("Crema count");
    assert_eq!(crema["count"], 1);
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session(state: HttpState) {
    let app = app(state).await;

    let (status, cookie, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register-president")
            .set_json(merged(
                account("eva@example.org", "11111111H", "Eva Sanz"),
                json!({
                    "communityName": "Las Acacias",
                    "communityAddress": "Avenida Norte 4",
                    "postalCode": "41001",
                    "communityCode": "ACA-22",
                }),
            )),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let cookie = cookie.expect("session cookie");

    let (status, cleared, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/auth/logout"),
        Some(&cookie),
    )
    .await;
    assert!(status.is_success());
    let cleared = cleared.expect("removal cookie");

    let (status, _, body) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/auth/me"),
        Some(&cleared),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}
