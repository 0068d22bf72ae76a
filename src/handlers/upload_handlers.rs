//! HTTP handlers for inline uploads.
//! Multipart bodies are buffered whole; the router's body limit bounds them.

use crate::{
    errors::AppError,
    handlers::asset_handlers::session_cookie,
    models::upload::{
        AttachmentDeleteRequest, AttachmentFields, AttachmentResponse, InlineFile, UploadedFile,
    },
    services::asset_service::AssetService,
};
use axum::{
    Json,
    extract::{Multipart, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

/// `POST /api/upload`: public image upload, multipart field `file`.
pub async fn upload_file(
    State(service): State<AssetService>,
    multipart: Multipart,
) -> Result<Json<UploadedFile>, AppError> {
    let (file, _) = read_multipart(multipart).await?;
    let uploaded = service.upload_inline(file).await?;
    Ok(Json(uploaded))
}

/// `POST /api/{area}/uploads`: editor attachment upload.
pub async fn upload_attachment(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let cookie = session_cookie(&service, &area, &headers);
    let (file, fields) = read_multipart(multipart).await?;
    let attachment = service
        .upload_attachment(&area, file, fields, cookie.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(AttachmentResponse { attachment })))
}

/// `DELETE /api/{area}/uploads`
pub async fn delete_attachment(
    State(service): State<AssetService>,
    Path(area): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<AttachmentDeleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let cookie = session_cookie(&service, &area, &headers);
    service
        .delete_attachment(
            &area,
            request.key.as_deref(),
            request.password.as_deref(),
            cookie.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Collect the `file` part and the known text fields; other parts are ignored.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Option<InlineFile>, AttachmentFields), AppError> {
    let mut file = None;
    let mut fields = AttachmentFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some(InlineFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "password" => fields.password = Some(field.text().await?),
            "uploader" => fields.uploader = Some(field.text().await?),
            "sourceUrl" => fields.source_url = Some(field.text().await?),
            _ => {}
        }
    }

    Ok((file, fields))
}
