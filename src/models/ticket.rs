//! Request and response bodies for the admin asset routes.

use serde::{Deserialize, Serialize};

/// A time-boxed permission to PUT one object. Never persisted.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Signed PUT URL the browser uploads to.
    pub upload_url: String,

    /// Key the object will be stored under.
    pub object_key: String,

    /// Where the object can be read once uploaded.
    pub public_url: String,

    /// Content type the upload URL was signed for.
    pub content_type: String,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub password: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub password: Option<String>,
    pub object_key: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct VerifyRequest {
    pub password: Option<String>,
}
