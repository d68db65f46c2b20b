//! Community overview, membership and presidency handlers.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CommunityCode, CommunityOverview, Error, ResidentSummary, Role, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Member row on the community page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDto {
    pub id: UserId,
    pub name: String,
    pub floor: String,
}

impl From<ResidentSummary> for ResidentDto {
    fn from(value: ResidentSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            floor: value.floor,
        }
    }
}

/// Overview of the session user's community.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub name: String,
    pub code: String,
    /// President's full name, or "Not assigned".
    pub president: String,
    pub residents: Vec<ResidentDto>,
}

impl From<CommunityOverview> for CommunityResponse {
    fn from(value: CommunityOverview) -> Self {
        Self {
            name: value.name,
            code: value.code,
            president: value.president,
            residents: value.residents.into_iter().map(ResidentDto::from).collect(),
        }
    }
}

/// Member entry for presidents and administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub floor: String,
    pub role: Role,
}

impl From<User> for MemberDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            floor: user.floor.as_ref().to_owned(),
            role: user.role,
        }
    }
}

/// Body for `PUT /api/v1/community`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCommunityRequest {
    pub code: String,
}

/// Body for `POST /api/v1/community/presidency`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CedePresidencyRequest {
    pub new_president_id: UserId,
}

#[utoipa::path(
    get,
    path = "/api/v1/community",
    responses(
        (status = 200, description = "Community overview", body = CommunityResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Role not allowed", body = Error)
    ),
    tags = ["community"],
    operation_id = "getCommunity"
)]
#[get("/community")]
pub async fn get_community(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CommunityResponse>> {
    let user_id = session.require_user_id()?;
    let overview = state.community.my_community(&user_id).await?;
    Ok(web::Json(overview.into()))
}

/// Move the session user to another community by code.
#[utoipa::path(
    put,
    path = "/api/v1/community",
    request_body = ChangeCommunityRequest,
    responses(
        (status = 204, description = "Community changed"),
        (status = 400, description = "Presidents must cede first", body = Error),
        (status = 404, description = "Unknown code", body = Error)
    ),
    tags = ["community"],
    operation_id = "changeCommunity"
)]
#[put("/community")]
pub async fn change_community(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangeCommunityRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let code = CommunityCode::new(&payload.code)?;
    state.community.change_community(&user_id, &code).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/community/presidency",
    request_body = CedePresidencyRequest,
    responses(
        (status = 204, description = "Presidency handed over"),
        (status = 400, description = "Successor not eligible", body = Error),
        (status = 403, description = "Only the president may cede", body = Error),
        (status = 404, description = "Unknown successor", body = Error)
    ),
    tags = ["community"],
    operation_id = "cedePresidency"
)]
#[post("/community/presidency")]
pub async fn cede_presidency(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CedePresidencyRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .community
        .cede_presidency(&user_id, &payload.new_president_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/community/members",
    responses(
        (status = 200, description = "Community members", body = [MemberDto]),
        (status = 403, description = "Presidents and administrators only", body = Error)
    ),
    tags = ["community"],
    operation_id = "listMembers"
)]
#[get("/community/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<MemberDto>>> {
    let user_id = session.require_user_id()?;
    let members = state.community.members(&user_id).await?;
    Ok(web::Json(members.into_iter().map(MemberDto::from).collect()))
}
