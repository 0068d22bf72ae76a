//! HTTP handlers for the admin asset routes of each content area.
//! All of them take the area from the path and delegate to `AssetService`.

use crate::{
    errors::AppError,
    models::ticket::{DeleteRequest, PresignRequest, UploadTicket, VerifyRequest},
    services::asset_service::AssetService,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Lifetime of the access cookie handed out by `verify`.
const ACCESS_COOKIE_MAX_AGE_SECS: u64 = 30 * 60;

/// `POST /api/{area}/assets/presign`
pub async fn presign_asset(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    payload: Result<Json<PresignRequest>, JsonRejection>,
) -> Result<Json<UploadTicket>, AppError> {
    let Json(request) = payload?;
    let ticket = service.issue_presigned_upload(&area, &request).await?;
    Ok(Json(ticket))
}

/// `POST /api/{area}/assets/delete`
pub async fn delete_asset(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    service.delete_object(&area, &request).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/{area}/verify`
///
/// Areas with cookie sessions also get a `Set-Cookie` for later uploads.
pub async fn verify_area(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let cookie = service.verify(&area, request.password.as_deref())?;

    let mut response = Json(json!({ "success": true })).into_response();
    if let (Some(value), Some(policy)) = (cookie, service.policies().get(&area)) {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
            policy.cookie_name(),
            value,
            ACCESS_COOKIE_MAX_AGE_SECS
        );
        let header_value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::internal(format!("building access cookie: {e}")))?;
        response
            .headers_mut()
            .insert(header::SET_COOKIE, header_value);
    }
    Ok(response)
}

/// `GET /api/{area}/verify`
///
/// Reports whether the caller still holds a valid access cookie.
pub async fn area_access(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let cookie = session_cookie(&service, &area, &headers);
    let authorized = service.session_status(&area, cookie.as_deref())?;
    Ok(Json(json!({ "authorized": authorized })))
}

/// The area's access cookie, for areas with cookie sessions.
pub(crate) fn session_cookie(
    service: &AssetService,
    area: &str,
    headers: &HeaderMap,
) -> Option<String> {
    let policy = service.policies().get(area)?;
    if !policy.cookie_session {
        return None;
    }
    request_cookie(headers, &policy.cookie_name())
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub(crate) fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
