//! Defines routes for the asset lifecycle.
//!
//! ## Structure
//! - **Per-area admin endpoints** (`{area}` is a configured content area)
//!   - `POST   /api/{area}/verify`          check the area password
//!   - `GET    /api/{area}/verify`          check the access cookie
//!   - `POST   /api/{area}/assets/presign`  issue a presigned PUT ticket
//!   - `POST   /api/{area}/assets/delete`   delete an uploaded object
//!   - `POST   /api/{area}/uploads`         upload an attachment inline
//!   - `DELETE /api/{area}/uploads`         delete an attachment
//!
//! - **Public endpoints**
//!   - `POST   /api/upload`                 direct image upload
//!   - `GET    /healthz`, `GET /readyz`

use crate::{
    handlers::{
        asset_handlers::{area_access, delete_asset, presign_asset, verify_area},
        health_handlers::{healthz, readyz},
        upload_handlers::{delete_attachment, upload_attachment, upload_file},
    },
    services::asset_service::AssetService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the router for all asset routes.
///
/// `max_upload_bytes` is the largest inline ceiling of any area; request
/// bodies are capped just above it so the per-area check can reject
/// oversized files with a readable 400.
pub fn routes(max_upload_bytes: usize) -> Router<AssetService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/upload", post(upload_file))
        .route("/api/{area}/verify", post(verify_area).get(area_access))
        .route("/api/{area}/assets/presign", post(presign_asset))
        .route("/api/{area}/assets/delete", post(delete_asset))
        .route(
            "/api/{area}/uploads",
            post(upload_attachment).delete(delete_attachment),
        )
        .layer(DefaultBodyLimit::max(
            max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
}
