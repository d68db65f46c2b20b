//! Incidents, complaints, documents and posts.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ComplaintRepository, DocumentListing, DocumentRepository, IncidentListing,
    IncidentRepository, PostRepository, RepositoryError,
};
use crate::domain::{
    CommunityId, Complaint, ComplaintId, ComplaintView, Document, DocumentId, DocumentView,
    Incident, IncidentId, IncidentSortField, IncidentState, IncidentView, Page, PageRequest, Post,
    PostId, PostView, SortDirection, UserId,
};

use super::{MemoryStore, Tables};

fn incident_order(sort: IncidentSortField, a: &Incident, b: &Incident) -> Ordering {
    match sort {
        IncidentSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        IncidentSortField::Title => a.title.cmp(&b.title),
        IncidentSortField::State => a.state.as_str().cmp(b.state.as_str()),
    }
}

fn newest_first(a: DateTime<Utc>, b: DateTime<Utc>) -> Ordering {
    b.cmp(&a)
}

impl Tables {
    fn complaint_page<F>(&self, page: PageRequest, keep: F) -> Page<ComplaintView>
    where
        F: Fn(&Complaint) -> bool,
    {
        let mut views: Vec<ComplaintView> = self
            .complaints
            .values()
            .filter(|complaint| keep(complaint))
            .filter_map(|complaint| {
                let author = self.user(&complaint.author_id)?;
                Some(ComplaintView {
                    complaint: complaint.clone(),
                    author_name: author.full_name.to_string(),
                })
            })
            .collect();
        views.sort_by(|a, b| {
            newest_first(a.complaint.created_at, b.complaint.created_at)
                .then_with(|| a.complaint.id.cmp(&b.complaint.id))
        });
        page.slice(&views)
    }
}

#[async_trait]
impl IncidentRepository for MemoryStore {
    async fn insert(&self, incident: &Incident) -> Result<(), RepositoryError> {
        self.tables().incidents.insert(incident.id, incident.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &IncidentId) -> Result<Option<Incident>, RepositoryError> {
        Ok(self.tables().incidents.get(id).cloned())
    }

    async fn update_state(
        &self,
        id: &IncidentId,
        state: IncidentState,
    ) -> Result<(), RepositoryError> {
        if let Some(incident) = self.tables().incidents.get_mut(id) {
            incident.state = state;
        }
        Ok(())
    }

    async fn delete(&self, id: &IncidentId) -> Result<(), RepositoryError> {
        self.tables().incidents.remove(id);
        Ok(())
    }

    async fn list(&self, listing: IncidentListing) -> Result<Page<IncidentView>, RepositoryError> {
        let tables = self.tables();
        let mut views: Vec<IncidentView> = tables
            .incidents
            .values()
            .filter(|incident| incident.community_id == listing.community)
            .filter_map(|incident| {
                let author = tables.user(&incident.author_id)?;
                Some(IncidentView {
                    incident: incident.clone(),
                    author_name: author.full_name.to_string(),
                })
            })
            .collect();
        views.sort_by(|a, b| {
            let order = incident_order(listing.sort, &a.incident, &b.incident);
            let order = match listing.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            };
            order.then_with(|| a.incident.id.cmp(&b.incident.id))
        });
        Ok(listing.page.slice(&views))
    }
}

#[async_trait]
impl ComplaintRepository for MemoryStore {
    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError> {
        self.tables()
            .complaints
            .insert(complaint.id, complaint.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Ok(self.tables().complaints.get(id).cloned())
    }

    async fn save_response(
        &self,
        id: &ComplaintId,
        response: &str,
        responded_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if let Some(complaint) = self.tables().complaints.get_mut(id) {
            complaint.response = Some(response.to_owned());
            complaint.responded_at = Some(responded_at);
        }
        Ok(())
    }

    async fn delete(&self, id: &ComplaintId) -> Result<(), RepositoryError> {
        self.tables().complaints.remove(id);
        Ok(())
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError> {
        Ok(self
            .tables()
            .complaint_page(page, |complaint| complaint.author_id == *author))
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, RepositoryError> {
        Ok(self
            .tables()
            .complaint_page(page, |complaint| complaint.community_id == *community))
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn insert(&self, document: &Document) -> Result<(), RepositoryError> {
        self.tables().documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError> {
        Ok(self.tables().documents.get(id).cloned())
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        self.tables().documents.remove(id);
        Ok(())
    }

    async fn list(&self, listing: DocumentListing) -> Result<Page<DocumentView>, RepositoryError> {
        let tables = self.tables();
        let mut views: Vec<DocumentView> = tables
            .documents
            .values()
            .filter(|document| {
                document.community_id == listing.community
                    && document.doc_type == listing.doc_type
                    && listing.published.matches(document.published_at)
            })
            .filter_map(|document| {
                let author = tables.user(&document.author_id)?;
                Some(DocumentView {
                    document: document.clone(),
                    author_name: author.full_name.to_string(),
                    author_email: author.email.to_string(),
                })
            })
            .collect();
        views.sort_by(|a, b| {
            newest_first(a.document.published_at, b.document.published_at)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        Ok(listing.page.slice(&views))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<(), RepositoryError> {
        self.tables().posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepositoryError> {
        Ok(self.tables().posts.get(id).cloned())
    }

    async fn delete(&self, id: &PostId) -> Result<(), RepositoryError> {
        self.tables().posts.remove(id);
        Ok(())
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepositoryError> {
        let tables = self.tables();
        let mut views: Vec<PostView> = tables
            .posts
            .values()
            .filter(|post| post.community_id == *community)
            .filter_map(|post| {
                let author = tables.user(&post.author_id)?;
                Some(PostView {
                    post: post.clone(),
                    author_name: author.full_name.to_string(),
                    author_role: author.role,
                })
            })
            .collect();
        views.sort_by(|a, b| {
            newest_first(a.post.created_at, b.post.created_at)
                .then_with(|| a.post.id.cmp(&b.post.id))
        });
        Ok(page.slice(&views))
    }
}
