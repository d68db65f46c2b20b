//! Port abstraction for user persistence adapters.
use async_trait::async_trait;

use crate::domain::{CommunityId, Dni, Email, User, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Email or DNI collisions yield
    /// [`RepositoryError::Duplicate`].
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// Persist role, community membership and password hash changes.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Whether the email is already registered.
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Whether the DNI is already registered.
    async fn dni_exists(&self, dni: &Dni) -> Result<bool, RepositoryError>;

    /// Members of a community ordered by full name.
    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<User>, RepositoryError>;
}
