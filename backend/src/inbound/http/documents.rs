//! Shared document handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    DocumentId, DocumentListItem, DocumentType, DocumentView, Error, PublicationFilter,
    document_comment,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::files::{AttachmentPayload, download_response};
use crate::inbound::http::pages::{PageDto, PageQuery};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/documents`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishDocumentRequest {
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub files: Vec<AttachmentPayload>,
}

/// Listing parameters for `GET /api/v1/documents`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentListQuery {
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub doc_type: DocumentType,
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// Day of month of the publication date.
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Published document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    pub id: DocumentId,
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub published_at: DateTime<Utc>,
    /// Download paths, one per stored file.
    pub files: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub can_delete: bool,
}

impl DocumentDto {
    fn new(view: DocumentView, can_delete: bool) -> Self {
        let DocumentView {
            document,
            author_name,
            author_email,
        } = view;
        Self {
            id: document.id,
            comment: document.comment,
            doc_type: document.doc_type,
            published_at: document.published_at,
            files: document
                .files
                .iter()
                .map(|name| format!("/api/v1/documents/files/{name}"))
                .collect(),
            author_name,
            author_email,
            can_delete,
        }
    }
}

impl From<DocumentListItem> for DocumentDto {
    fn from(item: DocumentListItem) -> Self {
        Self::new(item.view, item.can_delete)
    }
}

/// Publish a document. President only.
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body = PublishDocumentRequest,
    responses(
        (status = 201, description = "Document published", body = DocumentDto),
        (status = 400, description = "Invalid files", body = Error),
        (status = 403, description = "President only", body = Error)
    ),
    tags = ["documents"],
    operation_id = "publishDocument"
)]
#[post("/documents")]
pub async fn publish_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PublishDocumentRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let PublishDocumentRequest {
        comment,
        doc_type,
        files,
    } = payload.into_inner();
    let comment = document_comment(comment.as_deref())?;
    let files = files
        .into_iter()
        .map(AttachmentPayload::decode)
        .collect::<Result<Vec<_>, _>>()?;
    let view = state
        .documents
        .publish(&user_id, comment, doc_type, files)
        .await?;
    Ok(HttpResponse::Created().json(DocumentDto::new(view, true)))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "Document page", body = PageDto<DocumentDto>),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["documents"],
    operation_id = "listDocuments"
)]
#[get("/documents")]
pub async fn list_documents(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DocumentListQuery>,
) -> ApiResult<web::Json<PageDto<DocumentDto>>> {
    let user_id = session.require_user_id()?;
    let query = query.into_inner();
    let published = PublicationFilter::try_new(query.day, query.month, query.year)?;
    let page = PageQuery {
        page: query.page,
        size: query.size,
    }
    .to_request()?;
    let documents = state
        .documents
        .list(&user_id, query.doc_type, published, page)
        .await?;
    Ok(web::Json(PageDto::from_page(documents, DocumentDto::from)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 403, description = "Publishing president only", body = Error),
        (status = 404, description = "Unknown document", body = Error)
    ),
    tags = ["documents"],
    operation_id = "deleteDocument"
)]
#[delete("/documents/{id}")]
pub async fn delete_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: DocumentId = parse_id(&path, FieldName::new("id"))?;
    state.documents.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/files/{fileName}",
    params(("fileName" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown file", body = Error)
    ),
    tags = ["documents"],
    operation_id = "downloadDocumentFile",
    security([])
)]
#[get("/documents/files/{file_name}")]
pub async fn download_document_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let (name, bytes) = state.documents.download(&path).await?;
    Ok(download_response(&name, bytes))
}
