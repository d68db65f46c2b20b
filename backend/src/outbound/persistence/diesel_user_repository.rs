//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{
    CommunityId, Dni, Email, Floor, FullName, PasswordHash, Role, User, UserId,
};

use super::diesel_helpers::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row into a validated domain user.
pub(super) fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let UserRow {
        id,
        email,
        dni,
        full_name,
        floor,
        password_hash,
        role,
        community_id,
    } = row;
    let invalid = |reason: &dyn std::fmt::Display| invalid_row("user", id, reason);

    Ok(User {
        id: UserId::from_uuid(id),
        email: Email::new(email).map_err(|err| invalid(&err))?,
        dni: Dni::new(dni).map_err(|err| invalid(&err))?,
        full_name: FullName::new(full_name).map_err(|err| invalid(&err))?,
        floor: Floor::new(floor).map_err(|err| invalid(&err))?,
        password_hash: PasswordHash::new(password_hash),
        role: role.parse::<Role>().map_err(|err| invalid(&err))?,
        community_id: community_id.map(CommunityId::from_uuid),
    })
}

pub(super) fn new_user_row(user: &User) -> NewUserRow<'_> {
    NewUserRow {
        id: *user.id.as_uuid(),
        email: user.email.as_ref(),
        dni: user.dni.as_ref(),
        full_name: user.full_name.as_ref(),
        floor: user.floor.as_ref(),
        password_hash: user.password_hash.as_str(),
        role: user.role.as_str(),
        community_id: user.community_id.map(|id| *id.as_uuid()),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&new_user_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserChangeset {
            full_name: user.full_name.as_ref(),
            floor: user.floor.as_ref(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
            community_id: user.community_id.map(|id| *id.as_uuid()),
        };
        diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn dni_exists(&self, dni: &Dni) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::dni.eq(dni.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::community_id.eq(community.as_uuid()))
            .order((users::full_name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}
