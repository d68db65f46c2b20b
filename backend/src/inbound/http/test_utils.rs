//! Test helpers for inbound HTTP components.
//!
//! Handler tests run the real services against the in-memory adapters with a
//! frozen clock, so each test seeds exactly the users and data it needs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use super::state::{HttpState, HttpStateOptions, HttpStatePorts};
use super::{api_routes, error};
use crate::domain::ports::{CommunityRepository, PasswordHashError, PasswordHasher, UserRepository};
use crate::domain::test_support::{FixtureClock, fixture_date};
use crate::domain::{
    Community, CommunityCode, CommunityId, Dni, Email, Floor, FullName, Password, PasswordHash,
    Role, User, UserId,
};
use crate::inbound::ws::ChatHub;
use crate::outbound::memory::{MemoryFileStorage, MemoryStore};

/// Password every seeded user logs in with.
pub(crate) const PASSWORD: &str = "secret1";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible stand-in for Argon2 so handler tests stay fast.
pub(crate) struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${}", password.expose())))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str() == format!("plain${plaintext}"))
    }
}

/// Services over a fresh in-memory store plus seeding shortcuts.
pub(crate) struct TestWorld {
    pub state: HttpState,
    pub store: Arc<MemoryStore>,
    pub files: Arc<MemoryFileStorage>,
    seq: AtomicU32,
}

impl TestWorld {
    /// World whose clock reads 2025-03-10 09:00 UTC.
    pub(crate) fn new() -> Self {
        Self::at(FixtureClock::at(fixture_date(), 9, 0))
    }

    pub(crate) fn at(clock: FixtureClock) -> Self {
        Self::with_options(clock, HttpStateOptions::default())
    }

    pub(crate) fn with_options(clock: FixtureClock, options: HttpStateOptions) -> Self {
        let store = Arc::new(MemoryStore::new());
        let files = Arc::new(MemoryFileStorage::new());
        let ports = HttpStatePorts {
            users: store.clone(),
            communities: store.clone(),
            incidents: store.clone(),
            complaints: store.clone(),
            documents: store.clone(),
            posts: store.clone(),
            zones: store.clone(),
            reservations: store.clone(),
            polls: store.clone(),
            chat: store.clone(),
            files: files.clone(),
            hasher: Arc::new(PlainHasher),
            clock: Arc::new(clock),
        };
        let state = HttpState::new(ports, options, ChatHub::default());
        Self {
            state,
            store,
            files,
            seq: AtomicU32::new(1),
        }
    }

    fn account(&self, name: &str, role: Role, community: Option<CommunityId>) -> User {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        let slug: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        User {
            id: UserId::random(),
            email: Email::new(format!("{slug}{n}@example.org")).expect("fixture email"),
            dni: Dni::new(format!("{n:08}T")).expect("fixture dni"),
            full_name: FullName::new(name).expect("fixture name"),
            floor: Floor::new(format!("{n}A")).expect("fixture floor"),
            password_hash: PasswordHash::new(format!("plain${PASSWORD}")),
            role,
            community_id: community,
        }
    }

    /// Found a community with `code`, returning it and its president.
    pub(crate) async fn community(&self, code: &str) -> (Community, User) {
        let id = CommunityId::random();
        let president = self.account(&format!("President {code}"), Role::President, Some(id));
        let community = Community {
            id,
            name: format!("Community {code}"),
            address: "Calle Mayor 1".to_owned(),
            postal_code: "28001".to_owned(),
            code: CommunityCode::new(code).expect("fixture code"),
            president_id: Some(president.id),
        };
        self.store
            .create_with_president(&community, &president)
            .await
            .expect("community seeded");
        (community, president)
    }

    /// Add a member with `role` to `community`.
    pub(crate) async fn member(&self, community: &Community, role: Role, name: &str) -> User {
        let user = self.account(name, role, Some(community.id));
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .expect("member seeded");
        user
    }

    /// A user that belongs to no community.
    pub(crate) async fn drifter(&self, name: &str) -> User {
        let user = self.account(name, Role::Resident, None);
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .expect("user seeded");
        user
    }
}

/// Full API under `/api/v1` with test session middleware.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(api_routes))
}

/// Log `user` in and return the session cookie.
pub(crate) async fn login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    user: &User,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": user.email.as_ref(), "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Send `req` and return the status with the JSON body (`Null` when empty).
pub(crate) async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let res = actix_test::call_service(app, req.to_request()).await;
    let status = res.status();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// `code` field of an error body.
pub(crate) fn error_code(body: &Value) -> Option<&str> {
    body.get("code").and_then(Value::as_str)
}
