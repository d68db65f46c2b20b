//! Own-profile handlers.

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PasswordChange, Role, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Profile fields visible to their owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub role: Role,
    pub dni: String,
    pub full_name: String,
    pub floor: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email.as_ref().to_owned(),
            role: user.role,
            dni: user.dni.as_ref().to_owned(),
            full_name: user.full_name.as_ref().to_owned(),
            floor: user.floor.as_ref().to_owned(),
        }
    }
}

/// Body for `PUT /api/v1/profile/password`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub repeat_password: String,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        Self::try_new(
            &value.current_password,
            &value.new_password,
            &value.repeat_password,
        )
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Role not allowed", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.profile.get_profile(&user_id).await?;
    Ok(web::Json(user.into()))
}

/// Change the session user's password.
#[utoipa::path(
    put,
    path = "/api/v1/profile/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["profile"],
    operation_id = "changePassword"
)]
#[put("/profile/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.profile.change_password(&user_id, change).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{PASSWORD, TestWorld, error_code, login, send, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use rstest::rstest;
    use serde_json::json;

    #[actix_web::test]
    async fn owner_sees_their_profile() {
        let world = TestWorld::new();
        let (community, _) = world.community("SOL-01").await;
        let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &resident).await;

        let (status, body) = send(&app, TestRequest::get().uri("/api/v1/profile").cookie(cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fullName"], "Luis Gómez");
        assert_eq!(body["role"], "resident");
        assert_eq!(body["dni"], resident.dni.as_ref());
    }

    #[actix_web::test]
    async fn administrators_have_no_profile_page() {
        let world = TestWorld::new();
        let (community, _) = world.community("SOL-01").await;
        let admin = world.member(&community, Role::Administrator, "Finca Admin").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &admin).await;

        let (status, body) = send(&app, TestRequest::get().uri("/api/v1/profile").cookie(cookie)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_code(&body), Some("forbidden"));
    }

    #[actix_web::test]
    async fn password_change_takes_effect_on_next_login() {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;

        let (status, _) = send(
            &app,
            TestRequest::put()
                .uri("/api/v1/profile/password")
                .cookie(cookie)
                .set_json(json!({
                    "currentPassword": PASSWORD,
                    "newPassword": "brand-new",
                    "repeatPassword": "brand-new",
                })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
                "email": president.email.as_ref(),
                "password": "brand-new",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case("wrong-one", "brand-new", "brand-new", "currentPassword")]
    #[case(PASSWORD, "brand-new", "other-one", "repeatPassword")]
    #[case(PASSWORD, PASSWORD, PASSWORD, "newPassword")]
    #[actix_web::test]
    async fn rejected_password_changes_name_the_field(
        #[case] current: &str,
        #[case] new: &str,
        #[case] repeat: &str,
        #[case] field: &str,
    ) {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;

        let (status, body) = send(
            &app,
            TestRequest::put()
                .uri("/api/v1/profile/password")
                .cookie(cookie)
                .set_json(json!({
                    "currentPassword": current,
                    "newPassword": new,
                    "repeatPassword": repeat,
                })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], field);
    }
}
