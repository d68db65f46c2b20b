//! Attachment storage on the local filesystem.
//!
//! Files live in one directory per [`FileCategory`] below an upload root.
//! All access goes through a `cap_std` directory handle, so a stored name can
//! never reach outside the root even if validation upstream were bypassed.

use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{FileStorage, FileStorageError};
use crate::domain::{FileCategory, StoredFileName};

const CATEGORIES: [FileCategory; 3] = [
    FileCategory::Incidents,
    FileCategory::Complaints,
    FileCategory::Documents,
];

/// [`FileStorage`] backed by a capability-scoped directory.
#[derive(Clone)]
pub struct DirFileStorage {
    root: Arc<Dir>,
}

impl DirFileStorage {
    /// Open (creating if needed) `root` and its category directories.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when a directory cannot be created
    /// or opened.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        for category in CATEGORIES {
            dir.create_dir_all(category.dir_name())?;
        }
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn with_category<T, F>(
        &self,
        category: FileCategory,
        op: F,
    ) -> Result<T, FileStorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, FileStorageError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || {
            let dir = root
                .open_dir(category.dir_name())
                .map_err(|err| FileStorageError::io(err.to_string()))?;
            op(&dir)
        })
        .await
        .map_err(|err| FileStorageError::io(format!("storage task failed: {err}")))?
    }
}

fn io_error(name: &StoredFileName, err: &io::Error) -> FileStorageError {
    if err.kind() == ErrorKind::NotFound {
        FileStorageError::not_found(name.as_ref())
    } else {
        FileStorageError::io(err.to_string())
    }
}

#[async_trait]
impl FileStorage for DirFileStorage {
    async fn store(
        &self,
        category: FileCategory,
        name: &StoredFileName,
        bytes: Vec<u8>,
    ) -> Result<(), FileStorageError> {
        let name = name.clone();
        debug!(%category, file = %name, "writing file");
        self.with_category(category, move |dir| {
            dir.write(name.as_ref(), bytes)
                .map_err(|err| io_error(&name, &err))
        })
        .await
    }

    async fn read(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<Vec<u8>, FileStorageError> {
        let name = name.clone();
        self.with_category(category, move |dir| {
            dir.read(name.as_ref()).map_err(|err| io_error(&name, &err))
        })
        .await
    }

    async fn delete(
        &self,
        category: FileCategory,
        name: &StoredFileName,
    ) -> Result<(), FileStorageError> {
        let name = name.clone();
        self.with_category(category, move |dir| match dir.remove_file(name.as_ref()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(FileStorageError::io(err.to_string())),
        })
        .await
    }
}
