use crate::services::asset_service::LifecycleError;
use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// HTTP-facing error: a status and a message safe to show the caller.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::BadRequest(msg) => AppError::bad_request(msg),
            LifecycleError::Unauthorized(msg) => AppError::new(StatusCode::UNAUTHORIZED, msg),
            LifecycleError::UnknownArea(_) => AppError::new(StatusCode::NOT_FOUND, err.to_string()),
            LifecycleError::Unconfigured(msg) => AppError::internal(msg),
            LifecycleError::StoreUnavailable => AppError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Object storage is not configured.",
            ),
            LifecycleError::Upstream(cause) => {
                tracing::error!(error = %cause, "object store call failed");
                AppError::internal("The storage request failed.")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::bad_request(format!("Invalid JSON body: {}", err.body_text()))
    }
}

/// A body over the router limit is an oversized file, reported like the
/// per-area size check.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::bad_request("File exceeds the upload size limit.");
        }
        AppError::new(err.status(), err.body_text())
    }
}
