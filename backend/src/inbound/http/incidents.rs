//! Incident handlers.
//!
//! ```text
//! POST   /api/v1/incidents
//! GET    /api/v1/incidents?page=0&size=10&sortField=createdAt&direction=desc
//! PATCH  /api/v1/incidents/{id}/state {"state":"in_progress"}
//! DELETE /api/v1/incidents/{id}
//! GET    /api/v1/incidents/files/{fileName}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, Incident, IncidentDraft, IncidentId, IncidentSortField, IncidentState, IncidentView,
    SortDirection, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::files::{AttachmentPayload, decode_optional, download_response};
use crate::inbound::http::pages::{PageDto, PageQuery};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Public path of a stored incident photo.
fn image_url(name: &impl std::fmt::Display) -> String {
    format!("/api/v1/incidents/files/{name}")
}

/// Body for `POST /api/v1/incidents`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<AttachmentPayload>,
}

/// Body for `PATCH /api/v1/incidents/{id}/state`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateStateRequest {
    pub state: IncidentState,
}

/// Listing parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IncidentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `createdAt` (default), `title` or `state`.
    pub sort_field: Option<IncidentSortField>,
    /// `desc` (default) or `asc`.
    pub direction: Option<SortDirection>,
}

/// Incident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub id: IncidentId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub state: IncidentState,
    pub author_id: UserId,
    pub author_name: Option<String>,
}

impl From<Incident> for IncidentDto {
    fn from(incident: Incident) -> Self {
        Self {
            id: incident.id,
            title: incident.title,
            description: incident.description,
            location: incident.location,
            image_url: incident.image.as_ref().map(image_url),
            created_at: incident.created_at,
            state: incident.state,
            author_id: incident.author_id,
            author_name: None,
        }
    }
}

impl From<IncidentView> for IncidentDto {
    fn from(view: IncidentView) -> Self {
        Self {
            author_name: Some(view.author_name),
            ..Self::from(view.incident)
        }
    }
}

fn incident_id(raw: &str) -> Result<IncidentId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// Report an incident in the session user's community.
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 201, description = "Incident created", body = IncidentDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "createIncident"
)]
#[post("/incidents")]
pub async fn create_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateIncidentRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let CreateIncidentRequest {
        title,
        description,
        location,
        image,
    } = payload.into_inner();
    let draft = IncidentDraft::try_new(&title, &description, &location)?;
    let image = decode_optional(image)?;
    let incident = state.incidents.create(&user_id, draft, image).await?;
    Ok(HttpResponse::Created().json(IncidentDto::from(incident)))
}

#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    params(IncidentListQuery),
    responses(
        (status = 200, description = "Incident page", body = PageDto<IncidentDto>),
        (status = 400, description = "Invalid paging", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "listIncidents"
)]
#[get("/incidents")]
pub async fn list_incidents(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<IncidentListQuery>,
) -> ApiResult<web::Json<PageDto<IncidentDto>>> {
    let user_id = session.require_user_id()?;
    let query = query.into_inner();
    let page = PageQuery {
        page: query.page,
        size: query.size,
    }
    .to_request()?;
    let incidents = state
        .incidents
        .list(
            &user_id,
            query.sort_field.unwrap_or_default(),
            query.direction.unwrap_or_default(),
            page,
        )
        .await?;
    Ok(web::Json(PageDto::from_page(incidents, IncidentDto::from)))
}

/// Advance an incident's state. Presidents and administrators only.
#[utoipa::path(
    patch,
    path = "/api/v1/incidents/{id}/state",
    params(("id" = String, Path, description = "Incident id")),
    request_body = UpdateStateRequest,
    responses(
        (status = 200, description = "State changed", body = IncidentDto),
        (status = 400, description = "Transition not allowed", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown incident", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "updateIncidentState"
)]
#[patch("/incidents/{id}/state")]
pub async fn update_incident_state(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateStateRequest>,
) -> ApiResult<web::Json<IncidentDto>> {
    let user_id = session.require_user_id()?;
    let id = incident_id(&path)?;
    let incident = state
        .incidents
        .update_state(&user_id, &id, payload.state)
        .await?;
    Ok(web::Json(incident.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{id}",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 204, description = "Incident deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown incident", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "deleteIncident"
)]
#[delete("/incidents/{id}")]
pub async fn delete_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = incident_id(&path)?;
    state.incidents.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/incidents/files/{fileName}",
    params(("fileName" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name", body = Error),
        (status = 404, description = "Unknown file", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "downloadIncidentFile",
    security([])
)]
#[get("/incidents/files/{file_name}")]
pub async fn download_incident_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let (name, bytes) = state.incidents.download(&path).await?;
    Ok(download_response(&name, bytes))
}

#[cfg(test)]
#[path = "incidents_tests.rs"]
mod tests;
