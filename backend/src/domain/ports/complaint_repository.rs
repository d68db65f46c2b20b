//! Port abstraction for complaint persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CommunityId, Complaint, ComplaintId, ComplaintView, Page, PageRequest, UserId,
};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Store a new complaint.
    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError>;

    /// Fetch a complaint by identifier.
    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError>;

    /// Record the reply and its timestamp.
    async fn save_response(
        &self,
        id: &ComplaintId,
        response: &str,
        responded_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Remove a complaint.
    async fn delete(&self, id: &ComplaintId) -> Result<(), RepositoryError>;

    /// Complaints lodged by `author`, newest first.
    async fn list_by_author(
        &self,
        author: &UserId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError>;

    /// Complaints lodged in `community`, newest first.
    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError>;
}
