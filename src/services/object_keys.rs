//! Object key construction.
//!
//! Keys are namespaced by the area prefix and made unique by a random
//! segment, never by the filename alone.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

/// Substituted when a filename sanitizes to nothing.
pub const FALLBACK_FILE_NAME: &str = "file";

/// Extension used when an inline upload's filename has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Replace every character outside `[A-Za-z0-9._-]` with `-`.
///
/// Surrounding whitespace is trimmed first. Never returns an empty string.
pub fn sanitize_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `<epoch-millis>-<uuid-v4>`.
pub fn unique_id(now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), Uuid::new_v4())
}

/// Key for a presigned upload: `<prefix>/<unique-id>-<sanitized-name>`.
pub fn presign_key(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}",
        prefix,
        unique_id(now),
        sanitize_file_name(file_name)
    )
}

/// Key for a flat inline upload: `<prefix>/<uuid>.<ext>`, lower-cased.
pub fn flat_inline_key(prefix: &str, file_name: &str) -> String {
    let extension = file_extension(file_name).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{}/{}.{}", prefix, Uuid::new_v4(), extension).to_lowercase()
}

/// Key for a dated inline upload: `<prefix>/<yyyy>/<mm>/<uuid><.ext>`.
///
/// The extension is kept as sent (after sanitizing) and omitted if absent.
pub fn dated_inline_key(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    let extension = file_extension(file_name)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!(
        "{}/{}/{:02}/{}{}",
        prefix,
        now.year(),
        now.month(),
        Uuid::new_v4(),
        extension
    )
}

/// Sanitized text after the last `.` of the filename, if any.
fn file_extension(file_name: &str) -> Option<String> {
    let sanitized = sanitize_file_name(file_name);
    let (_, extension) = sanitized.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_string())
    }
}
