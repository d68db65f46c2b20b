//! PostgreSQL-backed `ComplaintRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ComplaintRepository, RepositoryError};
use crate::domain::{
    CommunityId, Complaint, ComplaintId, ComplaintView, Page, PageRequest, UserId,
};

use super::diesel_helpers::{count_to_u64, map_diesel_error, map_pool_error, page_window};
use super::diesel_incident_repository::stored_name;
use super::models::{ComplaintRow, NewComplaintRow};
use super::pool::DbPool;
use super::schema::{complaints, users};

/// Diesel-backed implementation of the complaint repository port.
#[derive(Clone)]
pub struct DieselComplaintRepository {
    pool: DbPool,
}

impl DieselComplaintRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_complaint(row: ComplaintRow) -> Result<Complaint, RepositoryError> {
    Ok(Complaint {
        id: ComplaintId::from_uuid(row.id),
        image: stored_name("complaint", row.id, row.image)?,
        content: row.content,
        anonymous: row.anonymous,
        created_at: row.created_at,
        response: row.response,
        responded_at: row.responded_at,
        author_id: UserId::from_uuid(row.author_id),
        community_id: CommunityId::from_uuid(row.community_id),
    })
}

fn rows_to_views(rows: Vec<(ComplaintRow, String)>) -> Result<Vec<ComplaintView>, RepositoryError> {
    rows.into_iter()
        .map(|(row, author_name)| {
            row_to_complaint(row).map(|complaint| ComplaintView {
                complaint,
                author_name,
            })
        })
        .collect()
}

#[async_trait]
impl ComplaintRepository for DieselComplaintRepository {
    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewComplaintRow {
            id: *complaint.id.as_uuid(),
            content: &complaint.content,
            anonymous: complaint.anonymous,
            image: complaint.image.as_ref().map(AsRef::as_ref),
            created_at: complaint.created_at,
            response: complaint.response.as_deref(),
            responded_at: complaint.responded_at,
            author_id: *complaint.author_id.as_uuid(),
            community_id: *complaint.community_id.as_uuid(),
        };
        diesel::insert_into(complaints::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = complaints::table
            .filter(complaints::id.eq(id.as_uuid()))
            .select(ComplaintRow::as_select())
            .first::<ComplaintRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_complaint).transpose()
    }

    async fn save_response(
        &self,
        id: &ComplaintId,
        response: &str,
        responded_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(complaints::table.filter(complaints::id.eq(id.as_uuid())))
            .set((
                complaints::response.eq(Some(response)),
                complaints::responded_at.eq(Some(responded_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &ComplaintId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(complaints::table.filter(complaints::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_window(page);

        let total: i64 = complaints::table
            .filter(complaints::author_id.eq(author.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(ComplaintRow, String)> = complaints::table
            .inner_join(users::table)
            .filter(complaints::author_id.eq(author.as_uuid()))
            .order((complaints::created_at.desc(), complaints::id.asc()))
            .select((ComplaintRow::as_select(), users::full_name))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_to_views(rows)?, count_to_u64(total), page))
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_window(page);

        let total: i64 = complaints::table
            .filter(complaints::community_id.eq(community.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(ComplaintRow, String)> = complaints::table
            .inner_join(users::table)
            .filter(complaints::community_id.eq(community.as_uuid()))
            .order((complaints::created_at.desc(), complaints::id.asc()))
            .select((ComplaintRow::as_select(), users::full_name))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_to_views(rows)?, count_to_u64(total), page))
    }
}
