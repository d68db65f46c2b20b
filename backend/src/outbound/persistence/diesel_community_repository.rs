//! PostgreSQL-backed `CommunityRepository` implementation using Diesel ORM.
//!
//! Founding a community and handing the presidency over each run in one
//! transaction so the `communities.president_id` pointer and the user roles
//! never disagree.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CommunityRepository, RepositoryError};
use crate::domain::{Community, CommunityCode, CommunityId, Role, User, UserId};

use super::diesel_helpers::{invalid_row, map_diesel_error, map_pool_error};
use super::diesel_user_repository::new_user_row;
use super::models::CommunityRow;
use super::pool::DbPool;
use super::schema::{communities, users};

/// Diesel-backed implementation of the community repository port.
#[derive(Clone)]
pub struct DieselCommunityRepository {
    pool: DbPool,
}

impl DieselCommunityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_community(row: CommunityRow) -> Result<Community, RepositoryError> {
    let code = CommunityCode::new(&row.code).map_err(|err| invalid_row("community", row.id, err))?;
    Ok(Community {
        id: CommunityId::from_uuid(row.id),
        name: row.name,
        address: row.address,
        postal_code: row.postal_code,
        code,
        president_id: row.president_id.map(UserId::from_uuid),
    })
}

fn community_row(community: &Community) -> CommunityRow {
    CommunityRow {
        id: *community.id.as_uuid(),
        name: community.name.clone(),
        address: community.address.clone(),
        postal_code: community.postal_code.clone(),
        code: community.code.as_ref().to_owned(),
        president_id: None,
    }
}

#[async_trait]
impl CommunityRepository for DieselCommunityRepository {
    async fn create_with_president(
        &self,
        community: &Community,
        president: &User,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let community_row = community_row(community);
        let president_row = new_user_row(president);
        let community_id = *community.id.as_uuid();
        let president_id = *president.id.as_uuid();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                // The president row references the community, and the
                // community points back at its president once both exist.
                diesel::insert_into(communities::table)
                    .values(&community_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(users::table)
                    .values(&president_row)
                    .execute(conn)
                    .await?;
                diesel::update(communities::table.filter(communities::id.eq(community_id)))
                    .set(communities::president_id.eq(Some(president_id)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = communities::table
            .filter(communities::id.eq(id.as_uuid()))
            .select(CommunityRow::as_select())
            .first::<CommunityRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_community).transpose()
    }

    async fn find_by_code(
        &self,
        code: &CommunityCode,
    ) -> Result<Option<Community>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = communities::table
            .filter(communities::code.eq(code.as_ref()))
            .select(CommunityRow::as_select())
            .first::<CommunityRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_community).transpose()
    }

    async fn code_exists(&self, code: &CommunityCode) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            communities::table.filter(communities::code.eq(code.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn transfer_presidency(
        &self,
        community: &CommunityId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let community_id = *community.as_uuid();
        let from_id = *from.as_uuid();
        let to_id = *to.as_uuid();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(users::table.filter(users::id.eq(from_id)))
                    .set(users::role.eq(Role::Resident.as_str()))
                    .execute(conn)
                    .await?;
                diesel::update(users::table.filter(users::id.eq(to_id)))
                    .set(users::role.eq(Role::President.as_str()))
                    .execute(conn)
                    .await?;
                diesel::update(communities::table.filter(communities::id.eq(community_id)))
                    .set(communities::president_id.eq(Some(to_id)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
