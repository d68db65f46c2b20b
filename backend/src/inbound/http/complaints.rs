//! Complaint handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ComplaintContent, ComplaintId, ComplaintView, Error, Page, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::files::{AttachmentPayload, decode_optional, download_response};
use crate::inbound::http::pages::PageQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/complaints`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub content: String,
    #[serde(default)]
    pub anonymous: bool,
    pub image: Option<AttachmentPayload>,
}

/// Body for `PUT /api/v1/complaints/{id}/response`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ReplyRequest {
    pub response: String,
}

/// Complaint as seen by a community member.
///
/// The author is never identified beyond `authorName`, which reads
/// `Anonymous` for anonymous complaints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDto {
    pub id: ComplaintId,
    pub content: String,
    pub anonymous: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub author_name: String,
    /// Whether the session user lodged it.
    pub own: bool,
}

impl ComplaintDto {
    fn from_view(view: ComplaintView, viewer: &UserId) -> Self {
        let author_name = view.display_author().to_owned();
        let complaint = view.complaint;
        Self {
            id: complaint.id,
            content: complaint.content,
            anonymous: complaint.anonymous,
            image_url: complaint
                .image
                .map(|name| format!("/api/v1/complaints/files/{name}")),
            created_at: complaint.created_at,
            response: complaint.response,
            responded_at: complaint.responded_at,
            author_name,
            own: complaint.author_id == *viewer,
        }
    }
}

/// Page of complaints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPage {
    pub complaints: Vec<ComplaintDto>,
    pub total_pages: u64,
    pub current_page: u32,
}

impl ComplaintPage {
    fn from_page(page: Page<ComplaintView>, viewer: &UserId) -> Self {
        let total_pages = page.total_pages();
        let current_page = page.request.page();
        Self {
            complaints: page
                .content
                .into_iter()
                .map(|view| ComplaintDto::from_view(view, viewer))
                .collect(),
            total_pages,
            current_page,
        }
    }
}

fn complaint_id(raw: &str) -> Result<ComplaintId, Error> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint lodged", body = ComplaintDto),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["complaints"],
    operation_id = "createComplaint"
)]
#[post("/complaints")]
pub async fn create_complaint(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateComplaintRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let CreateComplaintRequest {
        content,
        anonymous,
        image,
    } = payload.into_inner();
    let content = ComplaintContent::try_new(&content)?;
    let image = decode_optional(image)?;
    let view = state
        .complaints
        .create(&user_id, content, anonymous, image)
        .await?;
    Ok(HttpResponse::Created().json(ComplaintDto::from_view(view, &user_id)))
}

/// Complaints lodged by the session user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/complaints/mine",
    params(PageQuery),
    responses((status = 200, description = "Own complaints", body = ComplaintPage)),
    tags = ["complaints"],
    operation_id = "myComplaints"
)]
#[get("/complaints/mine")]
pub async fn my_complaints(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ComplaintPage>> {
    let user_id = session.require_user_id()?;
    let page = state
        .complaints
        .mine(&user_id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(ComplaintPage::from_page(page, &user_id)))
}

/// Complaints of the session user's community, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    params(PageQuery),
    responses((status = 200, description = "Community complaints", body = ComplaintPage)),
    tags = ["complaints"],
    operation_id = "communityComplaints"
)]
#[get("/complaints")]
pub async fn community_complaints(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ComplaintPage>> {
    let user_id = session.require_user_id()?;
    let page = state
        .complaints
        .community(&user_id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(ComplaintPage::from_page(page, &user_id)))
}

#[utoipa::path(
    put,
    path = "/api/v1/complaints/{id}/response",
    params(("id" = String, Path, description = "Complaint id")),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply stored", body = ComplaintDto),
        (status = 403, description = "Presidents and administrators only", body = Error),
        (status = 404, description = "Unknown complaint", body = Error)
    ),
    tags = ["complaints"],
    operation_id = "replyComplaint"
)]
#[put("/complaints/{id}/response")]
pub async fn reply_complaint(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReplyRequest>,
) -> ApiResult<web::Json<ComplaintDto>> {
    let user_id = session.require_user_id()?;
    let id = complaint_id(&path)?;
    let view = state
        .complaints
        .reply(&user_id, &id, &payload.response)
        .await?;
    Ok(web::Json(ComplaintDto::from_view(view, &user_id)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/complaints/{id}",
    params(("id" = String, Path, description = "Complaint id")),
    responses(
        (status = 204, description = "Complaint deleted"),
        (status = 403, description = "President or author only", body = Error),
        (status = 404, description = "Unknown complaint", body = Error)
    ),
    tags = ["complaints"],
    operation_id = "deleteComplaint"
)]
#[delete("/complaints/{id}")]
pub async fn delete_complaint(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = complaint_id(&path)?;
    state.complaints.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/complaints/files/{fileName}",
    params(("fileName" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown file", body = Error)
    ),
    tags = ["complaints"],
    operation_id = "downloadComplaintFile",
    security([])
)]
#[get("/complaints/files/{file_name}")]
pub async fn download_complaint_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let (name, bytes) = state.complaints.download(&path).await?;
    Ok(download_response(&name, bytes))
}

#[cfg(test)]
mod tests {
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestWorld, error_code, login, send, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use rstest::rstest;
    use serde_json::json;

    #[actix_web::test]
    async fn anonymous_complaints_hide_the_author() {
        let world = TestWorld::new();
        let (community, president) = world.community("SOL-01").await;
        let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &resident).await;

        let (status, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/complaints")
                .cookie(cookie.clone())
                .set_json(json!({"content": "Noise after midnight", "anonymous": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["authorName"], "Anonymous");
        assert_eq!(created["own"], true);

        let president_cookie = login(&app, &president).await;
        let (status, page) = send(
            &app,
            TestRequest::get()
                .uri("/api/v1/complaints")
                .cookie(president_cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalPages"], 1);
        assert_eq!(page["currentPage"], 0);
        assert_eq!(page["complaints"][0]["authorName"], "Anonymous");
        assert_eq!(page["complaints"][0]["own"], false);

        let (_, mine) = send(
            &app,
            TestRequest::get()
                .uri("/api/v1/complaints/mine")
                .cookie(cookie),
        )
        .await;
        assert_eq!(mine["complaints"].as_array().map(Vec::len), Some(1));
    }

    #[rstest]
    #[case(Role::Administrator, StatusCode::OK)]
    #[case(Role::Resident, StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn replies_are_for_the_board(#[case] role: Role, #[case] expected: StatusCode) {
        let world = TestWorld::new();
        let (community, president) = world.community("SOL-01").await;
        let responder = world.member(&community, role, "Responder").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let author_cookie = login(&app, &president).await;
        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/complaints")
                .cookie(author_cookie)
                .set_json(json!({"content": "Bins overflowing"})),
        )
        .await;
        let id = created["id"].as_str().expect("id").to_owned();
        let cookie = login(&app, &responder).await;

        let (status, body) = send(
            &app,
            TestRequest::put()
                .uri(&format!("/api/v1/complaints/{id}/response"))
                .cookie(cookie)
                .set_json(json!({"response": "Collection moved to Tuesdays"})),
        )
        .await;
        assert_eq!(status, expected);
        if expected == StatusCode::OK {
            assert_eq!(body["response"], "Collection moved to Tuesdays");
            assert!(body["respondedAt"].is_string());
        }
    }

    #[actix_web::test]
    async fn administrators_cannot_delete_complaints() {
        let world = TestWorld::new();
        let (community, _) = world.community("SOL-01").await;
        let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
        let admin = world.member(&community, Role::Administrator, "Finca Admin").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &resident).await;
        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/complaints")
                .cookie(cookie.clone())
                .set_json(json!({"content": "Broken intercom"})),
        )
        .await;
        let uri = format!("/api/v1/complaints/{}", created["id"].as_str().expect("id"));

        let admin_cookie = login(&app, &admin).await;
        let (status, body) = send(&app, TestRequest::delete().uri(&uri).cookie(admin_cookie)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_code(&body), Some("forbidden"));

        let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(cookie)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn blank_content_is_rejected() {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/complaints")
                .cookie(cookie)
                .set_json(json!({"content": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
