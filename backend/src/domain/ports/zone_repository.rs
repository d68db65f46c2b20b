//! Port abstraction for common zones.
use async_trait::async_trait;

use crate::domain::{CommonZone, CommunityId, ZoneId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Store a new zone. A name already used in the community yields
    /// [`RepositoryError::Duplicate`].
    async fn insert(&self, zone: &CommonZone) -> Result<(), RepositoryError>;

    /// Fetch a zone only when it belongs to `community`.
    async fn find_in_community(
        &self,
        id: &ZoneId,
        community: &CommunityId,
    ) -> Result<Option<CommonZone>, RepositoryError>;

    /// Whether `community` already has a zone called `name`.
    async fn name_exists(
        &self,
        community: &CommunityId,
        name: &str,
    ) -> Result<bool, RepositoryError>;

    /// Zones of `community` ordered by name.
    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<CommonZone>, RepositoryError>;

    /// Remove a zone and its reservation history.
    async fn delete(&self, id: &ZoneId) -> Result<(), RepositoryError>;
}
