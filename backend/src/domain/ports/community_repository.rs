//! Port abstraction for communities and the presidency handover.
use async_trait::async_trait;

use crate::domain::{Community, CommunityCode, CommunityId, User, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Atomically create a community together with its founding president.
    ///
    /// Code, email or DNI collisions yield [`RepositoryError::Duplicate`].
    async fn create_with_president(
        &self,
        community: &Community,
        president: &User,
    ) -> Result<(), RepositoryError>;

    /// Fetch a community by identifier.
    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, RepositoryError>;

    /// Fetch a community by its join code.
    async fn find_by_code(
        &self,
        code: &CommunityCode,
    ) -> Result<Option<Community>, RepositoryError>;

    /// Whether the join code is taken.
    async fn code_exists(&self, code: &CommunityCode) -> Result<bool, RepositoryError>;

    /// Atomically demote `from` to resident, promote `to` to president and
    /// record `to` as the community president.
    async fn transfer_presidency(
        &self,
        community: &CommunityId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), RepositoryError>;
}
