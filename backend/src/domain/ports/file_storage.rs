//! Port abstraction for storing uploaded files.
use async_trait::async_trait;

use crate::domain::{FileCategory, StoredFileName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by file storage adapters.
    pub enum FileStorageError {
        /// Underlying filesystem operation failed.
        Io { message: String } => "file storage failed: {message}",
        /// No file with the requested name exists.
        NotFound { name: String } => "file not found: {name}",
        /// The name would escape the storage directory.
        InvalidName { name: String } => "invalid file name: {name}",
    }
}

impl From<FileStorageError> for crate::domain::Error {
    fn from(value: FileStorageError) -> Self {
        match value {
            FileStorageError::NotFound { .. } => Self::not_found("file not found"),
            FileStorageError::InvalidName { name } => Self::invalid_field(
                "fileName",
                "invalid_name",
                format!("invalid file name: {name}"),
            ),
            FileStorageError::Io { message } => {
                Self::internal(format!("file storage failed: {message}"))
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write `bytes` under `name` inside the category directory.
    async fn store(
        &self,
        category: FileCategory,
        name: &StoredFileName,
        bytes: Vec<u8>,
    ) -> Result<(), FileStorageError>;

    /// Read a stored file.
    async fn read(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<Vec<u8>, FileStorageError>;

    /// Delete a stored file. Missing files are not an error.
    async fn delete(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<(), FileStorageError>;
}
