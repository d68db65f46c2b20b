//! Publishing and browsing community documents.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{DocumentListing, DocumentRepository, UserRepository};
use super::{
    ActorLoader, Attachment, Document, DocumentId, DocumentType, DocumentView, Error,
    FileCategory, Page, PageRequest, PublicationFilter, Role, StoredFileName, Uploader, User,
    UserId, require_community, require_same_community,
};

/// Document as listed for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListItem {
    pub view: DocumentView,
    pub can_delete: bool,
}

/// Document operations for community members.
#[derive(Clone)]
pub struct DocumentService {
    actors: ActorLoader,
    documents: Arc<dyn DocumentRepository>,
    uploads: Uploader,
    clock: Arc<dyn Clock>,
}

fn may_delete(viewer: &User, document: &Document) -> bool {
    viewer.role == Role::President && document.author_id == viewer.id
}

impl DocumentService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        documents: Arc<dyn DocumentRepository>,
        uploads: Uploader,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            documents,
            uploads,
            clock,
        }
    }

    /// Publish a document with one or more files. President only.
    pub async fn publish(
        &self,
        actor: &UserId,
        comment: Option<String>,
        doc_type: DocumentType,
        files: Vec<Attachment>,
    ) -> Result<DocumentView, Error> {
        let actor = self.actors.load(actor).await?;
        if actor.role != Role::President {
            warn!(user_id = %actor.id, "non-president tried to publish a document");
            return Err(Error::forbidden("only the president can publish documents"));
        }
        let community_id = require_community(&actor)?;
        let files = self.uploads.store_documents(files).await?;
        let document = Document {
            id: DocumentId::random(),
            comment,
            doc_type,
            published_at: self.clock.utc(),
            files,
            author_id: actor.id,
            community_id,
        };
        if let Err(error) = self.documents.insert(&document).await {
            self.uploads
                .discard_all(FileCategory::Documents, &document.files)
                .await;
            return Err(error.into());
        }
        info!(
            document_id = %document.id,
            doc_type = %doc_type,
            files = document.files.len(),
            "document published"
        );
        Ok(DocumentView {
            document,
            author_name: actor.full_name.to_string(),
            author_email: actor.email.to_string(),
        })
    }

    /// Documents of one type in the actor's community, newest first.
    pub async fn list(
        &self,
        actor: &UserId,
        doc_type: DocumentType,
        published: PublicationFilter,
        page: PageRequest,
    ) -> Result<Page<DocumentListItem>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        let documents = self
            .documents
            .list(DocumentListing {
                community,
                doc_type,
                published,
                page,
            })
            .await?;
        Ok(documents.map(|view| DocumentListItem {
            can_delete: may_delete(&actor, &view.document),
            view,
        }))
    }

    /// Delete a document and its files. Only the publishing president may.
    pub async fn delete(&self, actor: &UserId, id: &DocumentId) -> Result<(), Error> {
        let actor = self.actors.load(actor).await?;
        let document = self
            .documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("document {id} not found")))?;
        require_same_community(&actor, document.community_id)?;
        if !may_delete(&actor, &document) {
            return Err(Error::forbidden(
                "only the president who published a document can delete it",
            ));
        }
        self.documents.delete(id).await?;
        self.uploads
            .discard_all(FileCategory::Documents, &document.files)
            .await;
        info!(document_id = %id, "document deleted");
        Ok(())
    }

    /// Bytes of a stored document file.
    pub async fn download(&self, raw_name: &str) -> Result<(StoredFileName, Vec<u8>), Error> {
        self.uploads.read(FileCategory::Documents, raw_name).await
    }
}
