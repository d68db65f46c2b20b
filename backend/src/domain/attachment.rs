//! Uploaded files and the names they are stored under.

use std::fmt;

use uuid::Uuid;

use super::Error;

/// Feature area a stored file belongs to; each maps to its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Incidents,
    Complaints,
    Documents,
}

impl FileCategory {
    /// Directory name below the upload root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Incidents => "incidents",
            Self::Complaints => "complaints",
            Self::Documents => "documents",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Decoded upload as submitted by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Lower-cased extension of the original file name, if any.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Attachment;
    ///
    /// let file = Attachment { original_name: "Minutes.PDF".into(), bytes: vec![] };
    /// assert_eq!(file.extension().as_deref(), Some("pdf"));
    /// ```
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.original_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the upload is non-empty, has an allowed extension and fits the limit.
    pub fn validate(&self, allowed: &[String], max_bytes: u64) -> Result<(), Error> {
        if self.is_empty() {
            return Err(Error::invalid_field(
                "files",
                "empty_file",
                format!("file {} is empty", self.original_name),
            ));
        }
        let allowed_ext = self
            .extension()
            .is_some_and(|ext| allowed.iter().any(|candidate| candidate == &ext));
        if !allowed_ext {
            return Err(Error::invalid_field(
                "files",
                "extension_not_allowed",
                format!("file type not allowed: {}", self.original_name),
            ));
        }
        if self.len() > max_bytes {
            return Err(Error::invalid_field(
                "files",
                "too_large",
                format!("file {} exceeds {max_bytes} bytes", self.original_name),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("original_name", &self.original_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Extensions accepted for incident and complaint images.
pub fn image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "webp"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Generated name of a stored file: `<uuid>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFileName(String);

impl StoredFileName {
    /// Fresh random name keeping `extension`.
    pub fn generate(extension: &str) -> Self {
        Self(format!("{}.{extension}", Uuid::new_v4()))
    }

    /// Validate a name received from a client or the database.
    ///
    /// Only a single path component made of ASCII alphanumerics, `-`, `_`
    /// and `.` is accepted, never `.` or `..`.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw != "."
            && raw != ".."
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        valid.then(|| Self(raw.to_owned()))
    }

    /// Lower-cased extension.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// MIME type inferred from the extension.
    pub fn content_type(&self) -> &'static str {
        match self.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

impl AsRef<str> for StoredFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
