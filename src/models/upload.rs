//! Inline (server-side) uploads.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file received in a multipart body, fully buffered.
#[derive(Clone, Debug)]
pub struct InlineFile {
    /// Original filename as sent by the browser.
    pub file_name: String,

    /// MIME type as sent by the browser.
    pub content_type: String,

    pub data: Bytes,
}

impl InlineFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Response of the public direct-upload endpoint.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub success: bool,
    pub url: String,
    /// Object key the file was stored under.
    pub file_name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Extra multipart fields sent with an area attachment.
#[derive(Clone, Debug, Default)]
pub struct AttachmentFields {
    pub password: Option<String>,
    pub uploader: Option<String>,
    pub source_url: Option<String>,
}

/// An attachment stored for an area, returned to the editor that uploaded it.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub key: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    pub source_url: String,
    pub cdn_url: String,
    /// Hex SHA-256 of the payload.
    pub checksum: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct AttachmentResponse {
    pub attachment: Attachment,
}

#[derive(Deserialize, Default, Debug)]
pub struct AttachmentDeleteRequest {
    pub key: Option<String>,
    pub password: Option<String>,
}
