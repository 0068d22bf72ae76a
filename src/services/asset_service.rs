//! AssetService: the upload-asset lifecycle shared by every content area.
//!
//! Presigned upload tickets, deletes, inline uploads and password checks all
//! run through here. Each call resolves the area's `AssetPolicy`, consults the
//! `AdminGate` where the operation is admin-only, and makes at most one call
//! to the object store. Nothing is retried and nothing is persisted locally.

use crate::{
    models::{
        policy::{AssetPolicy, InlineKeyStyle, PolicyRegistry},
        ticket::{DeleteRequest, PresignRequest, UploadTicket},
        upload::{Attachment, AttachmentFields, InlineFile, UploadedFile},
    },
    services::{
        admin_gate::{AdminGate, GateError, access_cookie_value},
        object_keys,
        object_store::{DeleteOutcome, ObjectStore, PutOptions, StoreError},
    },
};
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("unknown content area `{0}`")]
    UnknownArea(String),
    #[error("{0}")]
    Unconfigured(String),
    #[error("object storage is not configured")]
    StoreUnavailable,
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl From<GateError> for LifecycleError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unconfigured(_) => {
                LifecycleError::Unconfigured("Admin password is not configured on the server.".into())
            }
            GateError::Missing => LifecycleError::BadRequest("Password is required.".into()),
            GateError::Denied => LifecycleError::Unauthorized("The password is incorrect.".into()),
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Shared state behind every route. Cheap to clone.
#[derive(Clone)]
pub struct AssetService {
    store: Option<Arc<dyn ObjectStore>>,
    gate: AdminGate,
    policies: Arc<PolicyRegistry>,
    public_upload_area: String,
}

impl AssetService {
    /// `store` is `None` when object storage credentials are absent; every
    /// store-backed call then fails with `StoreUnavailable`.
    pub fn new(
        store: Option<Arc<dyn ObjectStore>>,
        gate: AdminGate,
        policies: PolicyRegistry,
        public_upload_area: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gate,
            policies: Arc::new(policies),
            public_upload_area: public_upload_area.into(),
        }
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    pub fn store_configured(&self) -> bool {
        self.store.is_some()
    }

    fn policy(&self, area: &str) -> LifecycleResult<&AssetPolicy> {
        self.policies
            .get(area)
            .ok_or_else(|| LifecycleError::UnknownArea(area.to_string()))
    }

    fn store(&self) -> LifecycleResult<&Arc<dyn ObjectStore>> {
        self.store.as_ref().ok_or(LifecycleError::StoreUnavailable)
    }

    /// Check an area password.
    ///
    /// Returns the access cookie value for areas with cookie sessions. Those
    /// areas compare the trimmed password, as their upload routes do.
    pub fn verify(&self, area: &str, password: Option<&str>) -> LifecycleResult<Option<String>> {
        let policy = self.policy(area)?;
        let password = if policy.cookie_session {
            password.map(str::trim)
        } else {
            password
        };
        let secret = self.gate.check_required(area, password).inspect_err(|err| {
            if matches!(err, GateError::Denied) {
                warn!(area, "admin password rejected");
            }
        })?;
        Ok(policy
            .cookie_session
            .then(|| access_cookie_value(&secret)))
    }

    /// Whether `cookie` proves a prior verify for `area`.
    ///
    /// Always `false` for areas without cookie sessions.
    pub fn session_status(&self, area: &str, cookie: Option<&str>) -> LifecycleResult<bool> {
        let policy = self.policy(area)?;
        let secret = self.gate.configured_secret(area)?;
        Ok(policy.cookie_session
            && cookie.is_some_and(|value| value == access_cookie_value(&secret)))
    }

    /// Issue a presigned PUT ticket for one new object.
    pub async fn issue_presigned_upload(
        &self,
        area: &str,
        request: &PresignRequest,
    ) -> LifecycleResult<UploadTicket> {
        let policy = self.policy(area)?;
        let store = self.store()?;
        self.admin(area, request.password.as_deref())?;

        let file_name = request
            .file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LifecycleError::BadRequest("File name is required.".into()))?;

        let content_type = resolve_content_type(request.content_type.as_deref())?;
        if !policy.allows_type(&content_type) {
            return Err(LifecycleError::BadRequest(format!(
                "Unsupported file type `{content_type}`."
            )));
        }

        let object_key = object_keys::presign_key(&policy.prefix, file_name, Utc::now());
        let upload_url = store
            .presign_put(&object_key, &content_type, policy.presign_ttl)
            .await?;
        let public_url = store.public_url(&object_key);

        info!(
            area,
            object_key = %object_key,
            ttl_secs = policy.presign_ttl.as_secs(),
            "issued presigned upload"
        );

        Ok(UploadTicket {
            upload_url,
            object_key,
            public_url,
            content_type,
        })
    }

    /// Delete one object by key.
    ///
    /// A key the store reports as missing counts as deleted.
    pub async fn delete_object(
        &self,
        area: &str,
        request: &DeleteRequest,
    ) -> LifecycleResult<DeleteOutcome> {
        self.policy(area)?;
        self.admin(area, request.password.as_deref())?;
        let key = required_key(request.object_key.as_deref())?;
        self.delete_key(area, key).await
    }

    /// Public direct upload of an image, no password.
    pub async fn upload_inline(&self, file: Option<InlineFile>) -> LifecycleResult<UploadedFile> {
        let policy = self.policy(&self.public_upload_area)?;
        let store = self.store()?;
        let file = file.ok_or_else(|| LifecycleError::BadRequest("File is required.".into()))?;
        validate_inline(policy, &file, false)?;

        let key = object_keys::flat_inline_key(&policy.prefix, &file.file_name);
        let options = PutOptions::new(file.content_type.clone())
            .with_cache_control(policy.cache_control.clone())
            .with_metadata(
                "uploaded-at",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .with_metadata("original-name", file.file_name.clone());
        store.put_object(&key, file.data.clone(), &options).await?;
        let url = store.public_url(&key);

        info!(key = %key, size = file.size(), "stored direct upload");

        Ok(UploadedFile {
            success: true,
            url,
            file_name: key,
            size: file.size(),
            content_type: file.content_type,
        })
    }

    /// Store an attachment for an area editor.
    ///
    /// Authorized by password or by the access cookie from a prior verify.
    pub async fn upload_attachment(
        &self,
        area: &str,
        file: Option<InlineFile>,
        fields: AttachmentFields,
        cookie: Option<&str>,
    ) -> LifecycleResult<Attachment> {
        let policy = self.policy(area)?;
        self.session(area, fields.password.as_deref(), cookie)?;
        let file = file.ok_or_else(|| {
            LifecycleError::BadRequest("Select a file to upload.".into())
        })?;
        validate_inline(policy, &file, true)?;
        let store = self.store()?;

        let now = Utc::now();
        let key = match policy.inline_key_style {
            InlineKeyStyle::Flat => object_keys::flat_inline_key(&policy.prefix, &file.file_name),
            InlineKeyStyle::Dated => {
                object_keys::dated_inline_key(&policy.prefix, &file.file_name, now)
            }
        };
        let mime_type = if file.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            file.content_type.clone()
        };
        let checksum = hex::encode(Sha256::digest(&file.data));
        let cdn_url = store.public_url(&key);

        let options = PutOptions::new(mime_type.clone())
            .with_cache_control(policy.cache_control.clone())
            .with_metadata("original-name", file.file_name.clone())
            .with_metadata("checksum", checksum.clone())
            .with_metadata("cdn-url", cdn_url.clone());
        store.put_object(&key, file.data.clone(), &options).await?;

        info!(area, key = %key, size = file.size(), "stored attachment");

        Ok(Attachment {
            key,
            size: file.size(),
            file_name: file.file_name,
            mime_type,
            source_url: fields
                .source_url
                .map(|url| url.trim().to_string())
                .unwrap_or_default(),
            cdn_url,
            checksum,
            uploaded_by: fields
                .uploader
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "admin".to_string()),
            uploaded_at: now,
        })
    }

    /// Delete an attachment; same authorization as `upload_attachment`.
    pub async fn delete_attachment(
        &self,
        area: &str,
        key: Option<&str>,
        password: Option<&str>,
        cookie: Option<&str>,
    ) -> LifecycleResult<DeleteOutcome> {
        self.policy(area)?;
        let key = required_key(key)?;
        self.session(area, password, cookie)?;
        self.delete_key(area, key).await
    }

    async fn delete_key(&self, area: &str, key: &str) -> LifecycleResult<DeleteOutcome> {
        let store = self.store()?;
        let outcome = store.delete_object(key).await?;
        match outcome {
            DeleteOutcome::Deleted => info!(area, key, "deleted object"),
            DeleteOutcome::NotFound => debug!(area, key, "delete of missing object"),
        }
        Ok(outcome)
    }

    fn admin(&self, area: &str, password: Option<&str>) -> LifecycleResult<()> {
        self.gate.check(area, password).map(|_| ()).map_err(|err| {
            if matches!(err, GateError::Denied) {
                warn!(area, "admin password rejected");
            }
            err.into()
        })
    }

    fn session(
        &self,
        area: &str,
        password: Option<&str>,
        cookie: Option<&str>,
    ) -> LifecycleResult<()> {
        self.gate
            .check_session(area, password, cookie)
            .map_err(|err| {
                if matches!(err, GateError::Denied) {
                    warn!(area, "attachment access rejected");
                }
                err.into()
            })
    }
}

/// Blank or absent content types become `application/octet-stream`.
pub fn resolve_content_type(content_type: Option<&str>) -> LifecycleResult<String> {
    let trimmed = content_type.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(DEFAULT_CONTENT_TYPE.to_string());
    }
    if !trimmed.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return Err(LifecycleError::BadRequest("Invalid content type.".into()));
    }
    Ok(trimmed.to_string())
}

fn required_key(key: Option<&str>) -> LifecycleResult<&str> {
    key.map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| LifecycleError::BadRequest("Object key is required.".into()))
}

/// Size and type checks for inline uploads. The ceiling is inclusive.
fn validate_inline(policy: &AssetPolicy, file: &InlineFile, reject_empty: bool) -> LifecycleResult<()> {
    if !policy.allows_type(&file.content_type) {
        return Err(LifecycleError::BadRequest(format!(
            "Unsupported file type. Allowed: {}.",
            policy.allowed_types.join(", ")
        )));
    }
    if reject_empty && file.size() == 0 {
        return Err(LifecycleError::BadRequest("Empty files cannot be uploaded.".into()));
    }
    if file.size() > policy.max_upload_bytes {
        return Err(LifecycleError::BadRequest(format!(
            "File exceeds the {} byte limit.",
            policy.max_upload_bytes
        )));
    }
    Ok(())
}
