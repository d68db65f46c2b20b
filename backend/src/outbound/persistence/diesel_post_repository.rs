//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostRepository, RepositoryError};
use crate::domain::{CommunityId, Page, PageRequest, Post, PostId, PostView, Role, UserId};

use super::diesel_helpers::{
    count_to_u64, invalid_row, map_diesel_error, map_pool_error, page_window,
};
use super::models::{NewPostRow, PostRow};
use super::pool::DbPool;
use super::schema::{posts, users};

/// Diesel-backed implementation of the post repository port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_post(row: PostRow) -> Post {
    Post {
        id: PostId::from_uuid(row.id),
        title: row.title,
        content: row.content,
        author_id: UserId::from_uuid(row.author_id),
        community_id: CommunityId::from_uuid(row.community_id),
        created_at: row.created_at,
    }
}

fn row_to_view(row: PostRow, author_name: String, role: &str) -> Result<PostView, RepositoryError> {
    let author_role = role
        .parse::<Role>()
        .map_err(|err| invalid_row("post", row.id, format!("author {err}")))?;
    Ok(PostView {
        post: row_to_post(row),
        author_name,
        author_role,
    })
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPostRow {
            id: *post.id.as_uuid(),
            title: &post.title,
            content: &post.content,
            author_id: *post.author_id.as_uuid(),
            community_id: *post.community_id.as_uuid(),
            created_at: post.created_at,
        };
        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first::<PostRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_post))
    }

    async fn delete(&self, id: &PostId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(posts::table.filter(posts::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_window(page);

        let total: i64 = posts::table
            .filter(posts::community_id.eq(community.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(PostRow, String, String)> = posts::table
            .inner_join(users::table)
            .filter(posts::community_id.eq(community.as_uuid()))
            .order((posts::created_at.desc(), posts::id.asc()))
            .select((PostRow::as_select(), users::full_name, users::role))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let content = rows
            .into_iter()
            .map(|(row, name, role)| row_to_view(row, name, &role))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, count_to_u64(total), page))
    }
}
