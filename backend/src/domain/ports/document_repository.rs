//! Port abstraction for published documents.
use async_trait::async_trait;

use crate::domain::{
    CommunityId, Document, DocumentId, DocumentType, DocumentView, Page, PageRequest,
    PublicationFilter,
};

use super::RepositoryError;

/// Filtered listing of one community's documents, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentListing {
    pub community: CommunityId,
    pub doc_type: DocumentType,
    pub published: PublicationFilter,
    pub page: PageRequest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Store a new document.
    async fn insert(&self, document: &Document) -> Result<(), RepositoryError>;

    /// Fetch a document by identifier.
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError>;

    /// Remove a document.
    async fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError>;

    /// Page through documents matching the listing filters.
    async fn list(&self, listing: DocumentListing) -> Result<Page<DocumentView>, RepositoryError>;
}
