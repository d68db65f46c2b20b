//! Registration, login and session handlers.
//!
//! ```text
//! POST /api/v1/auth/register-president
//! POST /api/v1/auth/register-user
//! POST /api/v1/auth/login {"email":"ana@example.org","password":"secret1"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! GET  /api/v1/auth/session
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccountDraft, CommunityCode, CommunityId, CurrentUser, Dni, Email, Error, Floor, FullName,
    LoginCredentials, NewCommunity, Password, PresidentRegistration, ResidentRegistration, Role,
    User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Personal fields shared by both registration bodies.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountFields {
    #[schema(example = "ana@example.org")]
    pub email: String,
    #[schema(example = "12345678Z")]
    pub dni: String,
    pub full_name: String,
    #[schema(example = "3B")]
    pub floor: String,
    pub password: String,
    pub confirm_password: String,
}

impl TryFrom<AccountFields> for AccountDraft {
    type Error = Error;

    fn try_from(value: AccountFields) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(&value.email)?,
            dni: Dni::new(&value.dni)?,
            full_name: FullName::new(&value.full_name)?,
            floor: Floor::new(&value.floor)?,
            password: Password::confirmed(&value.password, &value.confirm_password)?,
        })
    }
}

/// Body for `POST /api/v1/auth/register-president`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPresidentRequest {
    #[serde(flatten)]
    pub account: AccountFields,
    pub community_name: String,
    pub community_address: String,
    #[schema(example = "28001")]
    pub postal_code: String,
    pub community_code: String,
}

impl TryFrom<RegisterPresidentRequest> for PresidentRegistration {
    type Error = Error;

    fn try_from(value: RegisterPresidentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            account: value.account.try_into()?,
            community: NewCommunity::try_new(
                &value.community_name,
                &value.community_address,
                &value.postal_code,
                &value.community_code,
            )?,
        })
    }
}

/// Body for `POST /api/v1/auth/register-user`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[serde(flatten)]
    pub account: AccountFields,
    pub community_code: String,
    /// `resident` (default) or `administrator`.
    pub role: Option<Role>,
}

impl TryFrom<RegisterUserRequest> for ResidentRegistration {
    type Error = Error;

    fn try_from(value: RegisterUserRequest) -> Result<Self, Self::Error> {
        let account = value.account.try_into()?;
        let code = CommunityCode::new(&value.community_code)?;
        Ok(Self::new(account, code, value.role)?)
    }
}

/// Body for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session user as returned by login and `me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub community_id: Option<CommunityId>,
    pub community_code: Option<String>,
    pub community_name: Option<String>,
}

impl From<CurrentUser> for MeResponse {
    fn from(value: CurrentUser) -> Self {
        let CurrentUser { user, community } = value;
        Self {
            id: user.id,
            email: user.email.as_ref().to_owned(),
            name: user.full_name.as_ref().to_owned(),
            role: user.role,
            community_id: user.community_id,
            community_code: community.as_ref().map(|c| c.code.to_string()),
            community_name: community.map(|c| c.name),
        }
    }
}

/// Account summary returned after registering a member.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub floor: String,
    pub role: Role,
    pub community_id: Option<CommunityId>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_ref().to_owned(),
            full_name: user.full_name.as_ref().to_owned(),
            floor: user.floor.as_ref().to_owned(),
            role: user.role,
            community_id: user.community_id,
        }
    }
}

/// Answer to `GET /api/v1/auth/session`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SessionStatus {
    pub valid: bool,
}

/// Found a community, create its president and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register-president",
    request_body = RegisterPresidentRequest,
    responses(
        (status = 201, description = "Community and president created", body = MeResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Concurrent registration", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerPresident",
    security([])
)]
#[post("/auth/register-president")]
pub async fn register_president(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterPresidentRequest>,
) -> ApiResult<HttpResponse> {
    let registration = PresidentRegistration::try_from(payload.into_inner())?;
    let president = state.auth.register_president(registration).await?;
    session.persist_user(&president.id)?;
    let current = state.auth.me(&president.id).await?;
    Ok(HttpResponse::Created().json(MeResponse::from(current)))
}

/// Join an existing community as resident or administrator.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register-user",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown community code", body = Error),
        (status = 409, description = "Concurrent registration", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerUser",
    security([])
)]
#[post("/auth/register-user")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let registration = ResidentRegistration::try_from(payload.into_inner())?;
    let user = state.auth.register_resident(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = MeResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<MeResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let user = state.auth.login(&credentials).await?;
    session.persist_user(&user.id)?;
    let current = state.auth.me(&user.id).await?;
    Ok(web::Json(current.into()))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The session user and their community.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MeResponse>> {
    let user_id = session.require_user_id()?;
    let current = state.auth.me(&user_id).await?;
    Ok(web::Json(current.into()))
}

/// Whether the session cookie maps to an existing user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    responses((status = 200, description = "Session validity", body = SessionStatus)),
    tags = ["auth"],
    operation_id = "sessionStatus",
    security([])
)]
#[get("/auth/session")]
pub async fn session_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionStatus>> {
    let valid = state.auth.session_valid(session.user_id()?).await?;
    Ok(web::Json(SessionStatus { valid }))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
