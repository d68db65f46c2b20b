//! PostgreSQL-backed `IncidentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IncidentListing, IncidentRepository, RepositoryError};
use crate::domain::{
    CommunityId, Incident, IncidentId, IncidentSortField, IncidentState, IncidentView, Page,
    SortDirection, StoredFileName, UserId,
};

use super::diesel_helpers::{
    count_to_u64, invalid_row, map_diesel_error, map_pool_error, page_window,
};
use super::models::{IncidentRow, NewIncidentRow};
use super::pool::DbPool;
use super::schema::{incidents, users};

/// Diesel-backed implementation of the incident repository port.
#[derive(Clone)]
pub struct DieselIncidentRepository {
    pool: DbPool,
}

impl DieselIncidentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Parse an optional stored file name, rejecting anything unsafe.
pub(super) fn stored_name(
    entity: &str,
    id: uuid::Uuid,
    raw: Option<String>,
) -> Result<Option<StoredFileName>, RepositoryError> {
    raw.map(|name| {
        StoredFileName::parse(&name)
            .ok_or_else(|| invalid_row(entity, id, format!("bad file name {name}")))
    })
    .transpose()
}

fn row_to_incident(row: IncidentRow) -> Result<Incident, RepositoryError> {
    let state = row
        .state
        .parse::<IncidentState>()
        .map_err(|err| invalid_row("incident", row.id, err))?;
    Ok(Incident {
        id: IncidentId::from_uuid(row.id),
        image: stored_name("incident", row.id, row.image)?,
        title: row.title,
        description: row.description,
        location: row.location,
        created_at: row.created_at,
        state,
        author_id: UserId::from_uuid(row.author_id),
        community_id: CommunityId::from_uuid(row.community_id),
    })
}

#[async_trait]
impl IncidentRepository for DieselIncidentRepository {
    async fn insert(&self, incident: &Incident) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewIncidentRow {
            id: *incident.id.as_uuid(),
            title: &incident.title,
            description: &incident.description,
            location: &incident.location,
            image: incident.image.as_ref().map(AsRef::as_ref),
            created_at: incident.created_at,
            state: incident.state.as_str(),
            author_id: *incident.author_id.as_uuid(),
            community_id: *incident.community_id.as_uuid(),
        };
        diesel::insert_into(incidents::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = incidents::table
            .filter(incidents::id.eq(id.as_uuid()))
            .select(IncidentRow::as_select())
            .first::<IncidentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_incident).transpose()
    }

    async fn update_state(
        &self,
        id: &IncidentId,
        state: IncidentState,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(incidents::table.filter(incidents::id.eq(id.as_uuid())))
            .set(incidents::state.eq(state.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &IncidentId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(incidents::table.filter(incidents::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self, listing: IncidentListing) -> Result<Page<IncidentView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let community = *listing.community.as_uuid();
        let (limit, offset) = page_window(listing.page);

        let total: i64 = incidents::table
            .filter(incidents::community_id.eq(community))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let query = incidents::table
            .inner_join(users::table)
            .filter(incidents::community_id.eq(community))
            .select((IncidentRow::as_select(), users::full_name))
            .into_boxed();
        let query = match (listing.sort, listing.direction) {
            (IncidentSortField::CreatedAt, SortDirection::Asc) => {
                query.order(incidents::created_at.asc())
            }
            (IncidentSortField::CreatedAt, SortDirection::Desc) => {
                query.order(incidents::created_at.desc())
            }
            (IncidentSortField::Title, SortDirection::Asc) => query.order(incidents::title.asc()),
            (IncidentSortField::Title, SortDirection::Desc) => query.order(incidents::title.desc()),
            (IncidentSortField::State, SortDirection::Asc) => query.order(incidents::state.asc()),
            (IncidentSortField::State, SortDirection::Desc) => {
                query.order(incidents::state.desc())
            }
        };

        let rows: Vec<(IncidentRow, String)> = query
            .then_order_by(incidents::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let content = rows
            .into_iter()
            .map(|(row, author_name)| {
                row_to_incident(row).map(|incident| IncidentView {
                    incident,
                    author_name,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, count_to_u64(total), listing.page))
    }
}
