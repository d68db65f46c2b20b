//! Port abstraction for incident persistence.
use async_trait::async_trait;

use crate::domain::{
    CommunityId, Incident, IncidentId, IncidentSortField, IncidentState, IncidentView, Page,
    PageRequest, SortDirection,
};

use super::RepositoryError;

/// Ordered, paginated listing of one community's incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncidentListing {
    pub community: CommunityId,
    pub sort: IncidentSortField,
    pub direction: SortDirection,
    pub page: PageRequest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Store a new incident.
    async fn insert(&self, incident: &Incident) -> Result<(), RepositoryError>;

    /// Fetch an incident by identifier.
    async fn find_by_id(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError>;

    /// Overwrite the lifecycle state.
    async fn update_state(
        &self,
        id: &IncidentId,
        state: IncidentState,
    ) -> Result<(), RepositoryError>;

    /// Remove an incident.
    async fn delete(&self, id: &IncidentId) -> Result<(), RepositoryError>;

    /// Page through a community's incidents with author names.
    async fn list(&self, listing: IncidentListing) -> Result<Page<IncidentView>, RepositoryError>;
}
