//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness: object store configured and areas loaded

use crate::services::asset_service::AssetService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe. Always returns 200 OK with a plain JSON body.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// HTTP 200 when object storage is configured and at least one area is
/// loaded, HTTP 503 otherwise. Does not call the store.
pub async fn readyz(State(service): State<AssetService>) -> impl IntoResponse {
    let store_ok = service.store_configured();
    let areas_ok = !service.policies().is_empty();

    let mut checks = HashMap::new();
    checks.insert(
        "object_store",
        CheckStatus {
            ok: store_ok,
            error: (!store_ok).then(|| "object storage credentials are not configured".into()),
        },
    );
    checks.insert(
        "areas",
        CheckStatus {
            ok: areas_ok,
            error: (!areas_ok).then(|| "no content areas are enabled".into()),
        },
    );

    let overall_ok = store_ok && areas_ok;
    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
