//! Community bulletin handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PostDraft, PostId, PostView, Role, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::{PageDto, PageQuery};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/posts`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl TryFrom<CreatePostRequest> for PostDraft {
    type Error = Error;

    fn try_from(value: CreatePostRequest) -> Result<Self, Self::Error> {
        Self::try_new(&value.title, &value.content)
    }
}

/// Bulletin post with its author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: UserId,
    pub author_name: String,
    pub author_role: Role,
}

impl From<PostView> for PostDto {
    fn from(view: PostView) -> Self {
        let PostView {
            post,
            author_name,
            author_role,
        } = view;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            author_id: post.author_id,
            author_name,
            author_role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post published", body = PostDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Residents and president only", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = PostDraft::try_from(payload.into_inner())?;
    let view = state.posts.create(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(PostDto::from(view)))
}

/// Posts of a community, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts/community/{code}",
    params(("code" = String, Path, description = "Community code"), PageQuery),
    responses(
        (status = 200, description = "Post page", body = PageDto<PostDto>),
        (status = 400, description = "Blank code", body = Error),
        (status = 404, description = "Unknown community", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts/community/{code}")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageDto<PostDto>>> {
    let user_id = session.require_user_id()?;
    let page = query.into_inner().to_request()?;
    let posts = state
        .posts
        .list_by_community(&user_id, &path, page)
        .await?;
    Ok(web::Json(PageDto::from_page(posts, PostDto::from)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id: PostId = parse_id(&path, FieldName::new("id"))?;
    state.posts.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestWorld, login, send, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use rstest::rstest;
    use serde_json::json;

    #[actix_web::test]
    async fn posts_carry_author_name_and_role() {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .cookie(cookie.clone())
                .set_json(json!({"title": "Garden party", "content": "Saturday at noon"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, page) = send(
            &app,
            TestRequest::get()
                .uri("/api/v1/posts/community/SOL-01")
                .cookie(cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["content"][0]["authorName"], president.full_name.as_ref());
        assert_eq!(page["content"][0]["authorRole"], "president");
    }

    #[actix_web::test]
    async fn blank_code_is_a_bad_request() {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri("/api/v1/posts/community/%20")
                .cookie(cookie),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "communityCode");
    }

    #[actix_web::test]
    async fn administrators_cannot_post() {
        let world = TestWorld::new();
        let (community, _) = world.community("SOL-01").await;
        let admin = world.member(&community, Role::Administrator, "Finca Admin").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &admin).await;

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .cookie(cookie)
                .set_json(json!({"title": "Hi", "content": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(true, StatusCode::NO_CONTENT)]
    #[case(false, StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn residents_delete_only_their_own_posts(
        #[case] own: bool,
        #[case] expected: StatusCode,
    ) {
        let world = TestWorld::new();
        let (community, _) = world.community("SOL-01").await;
        let author = world.member(&community, Role::Resident, "Author").await;
        let other = world.member(&community, Role::Resident, "Other").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let author_cookie = login(&app, &author).await;
        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .cookie(author_cookie.clone())
                .set_json(json!({"title": "Lost keys", "content": "Found by the door"})),
        )
        .await;
        let uri = format!("/api/v1/posts/{}", created["id"].as_str().expect("id"));
        let cookie = if own {
            author_cookie
        } else {
            login(&app, &other).await
        };

        let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(cookie)).await;
        assert_eq!(status, expected);
    }
}
