//! Attachment payloads and file download responses.

use actix_web::HttpResponse;
use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Attachment, Error, StoredFileName};

/// Uploaded file embedded in a JSON body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    /// Original client-side name; only its extension is kept.
    #[schema(example = "leak.jpg")]
    pub file_name: String,
    /// File bytes, base64 encoded. A `data:` URL prefix is accepted.
    pub content_base64: String,
}

impl AttachmentPayload {
    /// Decode into a domain attachment.
    pub fn decode(self) -> Result<Attachment, Error> {
        let encoded = strip_data_url(&self.content_base64);
        let bytes = STANDARD.decode(encoded.trim()).map_err(|err| {
            Error::invalid_field(
                "contentBase64",
                "invalid_base64",
                format!("attachment {} is not valid base64: {err}", self.file_name),
            )
        })?;
        Ok(Attachment {
            original_name: self.file_name,
            bytes,
        })
    }
}

fn strip_data_url(raw: &str) -> &str {
    match raw.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    }
}

/// Decode an optional attachment.
pub(crate) fn decode_optional(
    payload: Option<AttachmentPayload>,
) -> Result<Option<Attachment>, Error> {
    payload.map(AttachmentPayload::decode).transpose()
}

/// Serve stored bytes with a content type derived from the extension.
pub(crate) fn download_response(name: &StoredFileName, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, name.content_type()))
        .insert_header((CONTENT_DISPOSITION, format!("inline; filename=\"{name}\"")))
        .body(bytes)
}
