//! Storing, reading and discarding uploaded attachments.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{FileStorage, FileStorageError};
use super::{Attachment, Error, FileCategory, StoredFileName, image_extensions};

/// Size and type limits applied to uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub document_extensions: Vec<String>,
    pub document_max_bytes: u64,
    pub image_max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            document_extensions: ["pdf", "doc", "docx", "jpg", "jpeg", "png"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            document_max_bytes: 10 * 1024 * 1024,
            image_max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// File storage guarded by an [`UploadPolicy`].
#[derive(Clone)]
pub struct Uploader {
    storage: Arc<dyn FileStorage>,
    policy: UploadPolicy,
}

impl Uploader {
    /// Wrap a storage adapter.
    pub fn new(storage: Arc<dyn FileStorage>, policy: UploadPolicy) -> Self {
        Self { storage, policy }
    }

    /// Validate an incident or complaint image and store it.
    pub async fn store_image(
        &self,
        category: FileCategory,
        image: Attachment,
    ) -> Result<StoredFileName, Error> {
        image.validate(&image_extensions(), self.policy.image_max_bytes)?;
        self.store(category, image).await
    }

    /// Validate every document file before storing any of them.
    pub async fn store_documents(
        &self,
        files: Vec<Attachment>,
    ) -> Result<Vec<StoredFileName>, Error> {
        if files.is_empty() {
            return Err(Error::invalid_field(
                "files",
                "empty_value",
                "at least one file is required",
            ));
        }
        for file in &files {
            file.validate(
                &self.policy.document_extensions,
                self.policy.document_max_bytes,
            )?;
        }
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self.store(FileCategory::Documents, file).await {
                Ok(name) => stored.push(name),
                Err(error) => {
                    self.discard_all(FileCategory::Documents, &stored).await;
                    return Err(error);
                }
            }
        }
        Ok(stored)
    }

    /// Read a stored file named by a client.
    pub async fn read(
        &self,
        category: FileCategory,
        raw_name: &str,
    ) -> Result<(StoredFileName, Vec<u8>), Error> {
        let name = StoredFileName::parse(raw_name)
            .ok_or_else(|| FileStorageError::invalid_name(raw_name))?;
        let bytes = self.storage.read(category, &name).await?;
        Ok((name, bytes))
    }

    /// Remove stored files, logging failures instead of returning them.
    pub async fn discard_all(&self, category: FileCategory, names: &[StoredFileName]) {
        for name in names {
            if let Err(error) = self.storage.delete(category, name).await {
                warn!(%category, file = %name, %error, "failed to delete stored file");
            }
        }
    }

    async fn store(
        &self,
        category: FileCategory,
        file: Attachment,
    ) -> Result<StoredFileName, Error> {
        let extension = file.extension().unwrap_or_default();
        let name = StoredFileName::generate(&extension);
        debug!(%category, file = %name, bytes = file.len(), "storing upload");
        self.storage.store(category, &name, file.bytes).await?;
        Ok(name)
    }
}
