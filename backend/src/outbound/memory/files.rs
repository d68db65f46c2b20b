//! Attachment storage held in process memory.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{FileStorage, FileStorageError};
use crate::domain::{FileCategory, StoredFileName};

/// [`FileStorage`] keeping every file in a map. Used by the HTTP test suites.
#[derive(Default)]
pub struct MemoryFileStorage {
    files: Mutex<HashMap<(FileCategory, StoredFileName), Vec<u8>>>,
}

impl MemoryFileStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, HashMap<(FileCategory, StoredFileName), Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a file is currently stored.
    pub fn contains(&self, category: FileCategory, name: &StoredFileName) -> bool {
        self.files().contains_key(&(category, name.clone()))
    }

    /// Number of stored files across all categories.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn store(
        &self,
        category: FileCategory,
        name: &StoredFileName,
        bytes: Vec<u8>,
    ) -> Result<(), FileStorageError> {
        self.files().insert((category, name.clone()), bytes);
        Ok(())
    }

    async fn read(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<Vec<u8>, FileStorageError> {
        self.files()
            .get(&(category, name.clone()))
            .cloned()
            .ok_or_else(|| FileStorageError::not_found(name.as_ref()))
    }

    async fn delete(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<(), FileStorageError> {
        self.files().remove(&(category, name.clone()));
        Ok(())
    }
}
