//! Object store seam and its S3-compatible implementation.
//!
//! The lifecycle service only needs four things from the store: a signed
//! PUT URL, a synchronous PUT, a DELETE, and the public URL of a key.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, header};
use std::{borrow::Cow, fmt, time::Duration};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object store configuration: {0}")]
    Config(String),
    #[error("object store request failed: {0}")]
    Request(String),
    #[error("object store returned HTTP {status} for `{key}`")]
    Status { status: u16, key: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What a delete call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The store said the key did not exist.
    NotFound,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Signed URL allowing one PUT of `key` with `content_type` within `ttl`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StoreResult<String>;

    /// Store `body` under `key`.
    async fn put_object(&self, key: &str, body: Bytes, options: &PutOptions) -> StoreResult<()>;

    async fn delete_object(&self, key: &str) -> StoreResult<DeleteOutcome>;

    /// Where `key` can be read by browsers.
    fn public_url(&self, key: &str) -> String;
}

/// Headers sent along with an inline PUT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    pub cache_control: Option<String>,
    /// User metadata, stored as `x-amz-meta-<name>`.
    pub metadata: Vec<(String, String)>,
}

impl PutOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    pub fn with_cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((name.into(), value.into()));
        self
    }
}

/// Extra request headers for a PUT carrying `options`.
///
/// Metadata values outside printable ASCII are percent-encoded; S3 only
/// stores ASCII there and browsers send non-ASCII file names.
pub fn put_headers(options: &PutOptions) -> StoreResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(cache_control) = &options.cache_control {
        let value = HeaderValue::from_str(cache_control)
            .map_err(|e| StoreError::Request(format!("invalid cache-control: {e}")))?;
        headers.insert(header::CACHE_CONTROL, value);
    }
    for (name, value) in &options.metadata {
        let header_name = HeaderName::from_bytes(format!("x-amz-meta-{name}").as_bytes())
            .map_err(|e| StoreError::Request(format!("invalid metadata name `{name}`: {e}")))?;
        let value: Cow<'_, str> = if value.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            Cow::Borrowed(value.as_str())
        } else {
            urlencoding::encode(value)
        };
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| StoreError::Request(format!("invalid metadata `{name}`: {e}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Connection settings for an S3-compatible bucket.
#[derive(Clone)]
pub struct StoreSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// CDN or public bucket domain; objects are served from here when set.
    pub public_base_url: Option<String>,
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

/// Public URL of `key`.
///
/// `<public_base>/<key>` when a public base is configured, otherwise
/// `<endpoint>/<bucket>/<key>`. Slashes at the joins are normalized.
pub fn build_public_url(
    key: &str,
    public_base: Option<&str>,
    endpoint: &str,
    bucket: &str,
) -> String {
    let key = key.trim_start_matches('/');
    if let Some(base) = public_base.filter(|b| !b.is_empty()) {
        return format!("{}/{}", base.trim_end_matches('/'), key);
    }
    let endpoint = endpoint.trim_end_matches('/');
    match (endpoint.is_empty(), bucket.is_empty()) {
        (false, false) => format!("{endpoint}/{bucket}/{key}"),
        (false, true) => format!("{endpoint}/{key}"),
        (true, false) => format!("{bucket}/{key}"),
        (true, true) => key.to_string(),
    }
}

/// `ObjectStore` backed by `rust-s3`, path-style addressing.
pub struct S3ObjectStore {
    bucket: Box<s3::Bucket>,
    settings: StoreSettings,
}

impl S3ObjectStore {
    pub fn new(settings: StoreSettings) -> StoreResult<Self> {
        let region = s3::Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = s3::creds::Credentials::new(
            Some(settings.access_key.as_str()),
            Some(settings.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Config(e.to_string()))?;

        let bucket = s3::Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StoreError::Config(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket, settings })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StoreResult<String> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(content_type)
            .map_err(|e| StoreError::Request(format!("invalid content type: {e}")))?;
        headers.insert(header::CONTENT_TYPE, value);

        let expiry_secs = u32::try_from(ttl.as_secs()).unwrap_or(u32::MAX);
        self.bucket
            .presign_put(key, expiry_secs, Some(headers), None)
            .await
            .map_err(|e| StoreError::Request(format!("presigning PUT for `{key}`: {e}")))
    }

    async fn put_object(&self, key: &str, body: Bytes, options: &PutOptions) -> StoreResult<()> {
        // Extra headers are per bucket handle, so each PUT gets its own copy.
        let bucket = self
            .bucket
            .with_extra_headers(put_headers(options)?)
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let response = bucket
            .put_object_with_content_type(key, &body, &options.content_type)
            .await
            .map_err(|e| StoreError::Request(format!("uploading `{key}`: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Status {
                status,
                key: key.to_string(),
            });
        }
        debug!(key, size = body.len(), "stored object");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<DeleteOutcome> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StoreError::Request(format!("deleting `{key}`: {e}")))?;

        match response.status_code() {
            200..=299 => Ok(DeleteOutcome::Deleted),
            404 => Ok(DeleteOutcome::NotFound),
            status => Err(StoreError::Status {
                status,
                key: key.to_string(),
            }),
        }
    }

    fn public_url(&self, key: &str) -> String {
        build_public_url(
            key,
            self.settings.public_base_url.as_deref(),
            &self.settings.endpoint,
            &self.settings.bucket,
        )
    }
}
