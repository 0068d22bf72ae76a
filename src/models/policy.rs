//! Per-area asset policies.
//!
//! Every content area of the site (examiner photos, tube thumbnails,
//! interview thumbnails, policy-analysis attachments, ...) shares the same
//! asset lifecycle. An `AssetPolicy` carries the knobs that differ between
//! them: the key prefix, how long presigned URLs live, the upload ceiling,
//! which MIME types are accepted, and where the admin secret comes from.

use std::{collections::HashMap, time::Duration};

/// Image types accepted by the public direct-upload endpoint.
pub const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Image types accepted for interview thumbnails.
pub const THUMBNAIL_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/avif"];

pub const MIB: usize = 1024 * 1024;

/// Presigned URL lifetime for admin asset routes.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(60);

/// Cache policy for inline uploads.
pub const CACHE_CONTROL_LONG: &str = "max-age=31536000";

/// Cache policy for uploads whose keys are never reused.
pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// How inline uploads are laid out under the area prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKeyStyle {
    /// `<prefix>/<uuid>.<ext>`, lower-cased.
    Flat,
    /// `<prefix>/<yyyy>/<mm>/<uuid><.ext>`.
    Dated,
}

/// Asset lifecycle parameters for one content area.
#[derive(Debug, Clone)]
pub struct AssetPolicy {
    /// Area name as it appears in the URL path (e.g. `expert-services`).
    pub area: String,

    /// Object key namespace, without leading or trailing slash.
    pub prefix: String,

    /// Environment variable holding the area's admin secret.
    pub secret_env: String,

    /// Lifetime of presigned upload URLs.
    pub presign_ttl: Duration,

    /// Largest accepted inline upload, inclusive.
    pub max_upload_bytes: usize,

    /// Accepted MIME types. Empty means any type.
    pub allowed_types: Vec<String>,

    pub inline_key_style: InlineKeyStyle,

    /// `Cache-Control` stored with inline uploads.
    pub cache_control: String,

    /// Whether a successful verify hands out an access cookie.
    pub cookie_session: bool,
}

impl AssetPolicy {
    pub fn new(
        area: impl Into<String>,
        prefix: impl Into<String>,
        secret_env: impl Into<String>,
    ) -> Self {
        Self {
            area: area.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
            secret_env: secret_env.into(),
            presign_ttl: DEFAULT_PRESIGN_TTL,
            max_upload_bytes: 10 * MIB,
            allowed_types: Vec::new(),
            inline_key_style: InlineKeyStyle::Flat,
            cache_control: CACHE_CONTROL_LONG.to_string(),
            cookie_session: false,
        }
    }

    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_allowed_types(mut self, types: &[&str]) -> Self {
        self.allowed_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_inline_key_style(mut self, style: InlineKeyStyle) -> Self {
        self.inline_key_style = style;
        self
    }

    pub fn with_cache_control(mut self, value: &str) -> Self {
        self.cache_control = value.to_string();
        self
    }

    pub fn with_cookie_session(mut self, enabled: bool) -> Self {
        self.cookie_session = enabled;
        self
    }

    /// Exact match against the allow-list; an empty list accepts everything.
    pub fn allows_type(&self, content_type: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == content_type)
    }

    pub fn cookie_name(&self) -> String {
        format!("{}-access", self.area)
    }
}

/// The content areas served by the site.
pub fn builtin_policies() -> Vec<AssetPolicy> {
    vec![
        AssetPolicy::new(
            "expert-services",
            "expert-services/examiners",
            "EXPERT_SERVICES_ADMIN_PASSWORD",
        ),
        AssetPolicy::new(
            "naraddon-tube",
            "naraddon-tube/thumbnails",
            "NARADDON_TUBE_PASSWORD",
        ),
        AssetPolicy::new(
            "business-voice",
            "business-voice/interview-thumbnails",
            "BUSINESS_VOICE_ADMIN_PASSWORD",
        )
        .with_presign_ttl(Duration::from_secs(3600))
        .with_max_upload_bytes(5 * MIB)
        .with_allowed_types(THUMBNAIL_TYPES),
        AssetPolicy::new(
            "policy-analysis",
            "policy-analysis",
            "POLICY_ANALYSIS_PASSWORD",
        )
        .with_max_upload_bytes(5 * MIB)
        .with_inline_key_style(InlineKeyStyle::Dated)
        .with_cache_control(CACHE_CONTROL_IMMUTABLE)
        .with_cookie_session(true),
        AssetPolicy::new("policy-news", "policy-news", "POLICY_NEWS_PASSWORD"),
        AssetPolicy::new("ttontok", "ttontok", "TTONTOK_WRITE_PASSWORD")
            .with_allowed_types(IMAGE_TYPES),
    ]
}

/// Lookup table from area name to policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, AssetPolicy>,
}

impl PolicyRegistry {
    pub fn new(policies: impl IntoIterator<Item = AssetPolicy>) -> Self {
        Self {
            policies: policies
                .into_iter()
                .map(|policy| (policy.area.clone(), policy))
                .collect(),
        }
    }

    pub fn get(&self, area: &str) -> Option<&AssetPolicy> {
        self.policies.get(area)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Largest inline upload ceiling across all areas.
    pub fn max_upload_bytes(&self) -> usize {
        self.policies
            .values()
            .map(|policy| policy.max_upload_bytes)
            .max()
            .unwrap_or(0)
    }
}
