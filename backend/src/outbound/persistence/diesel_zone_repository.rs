//! PostgreSQL-backed `ZoneRepository` implementation using Diesel ORM.
//!
//! Deleting a zone cascades to its reservations through the foreign key.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, ZoneRepository};
use crate::domain::{CommonZone, CommunityId, ZoneId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::ZoneRow;
use super::pool::DbPool;
use super::schema::zones;

/// Diesel-backed implementation of the zone repository port.
#[derive(Clone)]
pub struct DieselZoneRepository {
    pool: DbPool,
}

impl DieselZoneRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_zone(row: ZoneRow) -> CommonZone {
    CommonZone {
        id: ZoneId::from_uuid(row.id),
        name: row.name,
        community_id: CommunityId::from_uuid(row.community_id),
    }
}

#[async_trait]
impl ZoneRepository for DieselZoneRepository {
    async fn insert(&self, zone: &CommonZone) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ZoneRow {
            id: *zone.id.as_uuid(),
            name: zone.name.clone(),
            community_id: *zone.community_id.as_uuid(),
        };
        diesel::insert_into(zones::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_in_community(
        &self,
        id: &ZoneId,
        community: &CommunityId,
    ) -> Result<Option<CommonZone>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = zones::table
            .filter(zones::id.eq(id.as_uuid()))
            .filter(zones::community_id.eq(community.as_uuid()))
            .select(ZoneRow::as_select())
            .first::<ZoneRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_zone))
    }

    async fn name_exists(
        &self,
        community: &CommunityId,
        name: &str,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            zones::table
                .filter(zones::community_id.eq(community.as_uuid()))
                .filter(zones::name.eq(name)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<CommonZone>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ZoneRow> = zones::table
            .filter(zones::community_id.eq(community.as_uuid()))
            .order((zones::name.asc(), zones::id.asc()))
            .select(ZoneRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_zone).collect())
    }

    async fn delete(&self, id: &ZoneId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(zones::table.filter(zones::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
