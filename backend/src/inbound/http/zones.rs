//! Common zone handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CommonZone, Error, ZoneId, ZoneListItem};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/zones`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateZoneRequest {
    #[schema(example = "Paddle court")]
    pub name: String,
}

/// Bookable common zone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDto {
    pub id: ZoneId,
    pub name: String,
    pub can_delete: bool,
}

impl From<ZoneListItem> for ZoneDto {
    fn from(item: ZoneListItem) -> Self {
        Self {
            id: item.zone.id,
            name: item.zone.name,
            can_delete: item.can_delete,
        }
    }
}

impl From<CommonZone> for ZoneDto {
    fn from(zone: CommonZone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
            can_delete: true,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/zones",
    request_body = CreateZoneRequest,
    responses(
        (status = 201, description = "Zone created", body = ZoneDto),
        (status = 400, description = "Blank or duplicate name", body = Error),
        (status = 403, description = "President only", body = Error)
    ),
    tags = ["zones"],
    operation_id = "createZone"
)]
#[post("/zones")]
pub async fn create_zone(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateZoneRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let zone = state.zones.create(&user_id, &payload.name).await?;
    Ok(HttpResponse::Created().json(ZoneDto::from(zone)))
}

/// Zones of the session user's community, by name.
#[utoipa::path(
    get,
    path = "/api/v1/zones",
    responses((status = 200, description = "Zones", body = [ZoneDto])),
    tags = ["zones"],
    operation_id = "listZones"
)]
#[get("/zones")]
pub async fn list_zones(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ZoneDto>>> {
    let user_id = session.require_user_id()?;
    let zones = state.zones.list(&user_id).await?;
    Ok(web::Json(zones.into_iter().map(ZoneDto::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/zones/{id}",
    params(("id" = String, Path, description = "Zone id")),
    responses(
        (status = 204, description = "Zone deleted"),
        (status = 400, description = "Zone has upcoming reservations", body = Error),
        (status = 403, description = "President only", body = Error),
        (status = 404, description = "Unknown zone", body = Error)
    ),
    tags = ["zones"],
    operation_id = "deleteZone"
)]
#[delete("/zones/{id}")]
pub async fn delete_zone(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: ZoneId = parse_id(&path, FieldName::new("id"))?;
    state.zones.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
