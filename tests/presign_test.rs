//! Presigned upload and delete tests for the admin asset routes.

mod helpers;

use helpers::{
    ADMIN_PASSWORD, RecordingStore, StoreCall, assert_presign_key_shape, setup_test_app,
    setup_with, setup_without_store,
};
use serde_json::{Value, json};
use std::time::Duration;

#[tokio::test]
async fn test_presign_sanitizes_name_and_builds_public_url() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/expert-services/assets/presign")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "fileName": "a b?.PNG",
            "contentType": "image/png"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let key = body["objectKey"].as_str().unwrap();
    assert_presign_key_shape(key, "expert-services/examiners", "a-b-.PNG");
    assert_eq!(
        body["publicUrl"].as_str().unwrap(),
        format!("https://cdn.example.com/{key}")
    );
    assert!(body["uploadUrl"].as_str().unwrap().contains(key));

    assert_eq!(
        app.store.calls(),
        vec![StoreCall::Presign {
            key: key.to_string(),
            content_type: "image/png".into(),
            ttl: Duration::from_secs(60),
        }]
    );
}

#[tokio::test]
async fn test_presign_wrong_password_never_reaches_store() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/presign")
        .json(&json!({
            "password": "guess",
            "fileName": "thumb.jpg",
            "contentType": "image/jpeg"
        }))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_presign_missing_password_is_unauthorized() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/presign")
        .json(&json!({ "fileName": "thumb.jpg" }))
        .await;

    assert_eq!(response.status_code(), 401);
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_presign_requires_file_name() {
    let app = setup_test_app();

    for body in [
        json!({ "password": ADMIN_PASSWORD }),
        json!({ "password": ADMIN_PASSWORD, "fileName": "" }),
    ] {
        let response = app
            .client()
            .post("/api/naraddon-tube/assets/presign")
            .json(&body)
            .await;
        assert_eq!(response.status_code(), 400);
    }
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_presign_blank_content_type_defaults_to_octet_stream() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/presign")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "fileName": "clip.bin",
            "contentType": ""
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    match app.store.calls().as_slice() {
        [StoreCall::Presign { content_type, .. }] => {
            assert_eq!(content_type, "application/octet-stream")
        }
        calls => panic!("unexpected store calls: {calls:?}"),
    }
}

#[tokio::test]
async fn test_presign_same_name_twice_yields_distinct_keys() {
    let app = setup_test_app();
    let request = json!({
        "password": ADMIN_PASSWORD,
        "fileName": "photo.jpg",
        "contentType": "image/jpeg"
    });

    let first: Value = app
        .client()
        .post("/api/expert-services/assets/presign")
        .json(&request)
        .await
        .json();
    let second: Value = app
        .client()
        .post("/api/expert-services/assets/presign")
        .json(&request)
        .await
        .json();

    assert_ne!(first["objectKey"], second["objectKey"]);
}

#[tokio::test]
async fn test_thumbnail_area_uses_long_ttl_and_type_allow_list() {
    let app = setup_test_app();

    let rejected = app
        .client()
        .post("/api/business-voice/assets/presign")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "fileName": "clip.mp4",
            "contentType": "video/mp4"
        }))
        .await;
    assert_eq!(rejected.status_code(), 400);

    let accepted = app
        .client()
        .post("/api/business-voice/assets/presign")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "fileName": "cover.avif",
            "contentType": "image/avif"
        }))
        .await;
    assert_eq!(accepted.status_code(), 200);

    match app.store.calls().as_slice() {
        [StoreCall::Presign { key, ttl, .. }] => {
            assert!(key.starts_with("business-voice/interview-thumbnails/"));
            assert_eq!(*ttl, Duration::from_secs(3600));
        }
        calls => panic!("unexpected store calls: {calls:?}"),
    }
}

#[tokio::test]
async fn test_presign_without_store_is_service_unavailable() {
    let server = setup_without_store();

    let response = server
        .post("/api/expert-services/assets/presign")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "fileName": "photo.jpg"
        }))
        .await;

    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn test_presign_with_unconfigured_secret_is_server_error() {
    let app = setup_with(RecordingStore::new(), &["naraddon-tube"]);

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/presign")
        .json(&json!({ "password": "", "fileName": "thumb.jpg" }))
        .await;

    assert_eq!(response.status_code(), 500);
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_area_is_not_found() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/does-not-exist/assets/presign")
        .json(&json!({ "password": ADMIN_PASSWORD, "fileName": "a.png" }))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_store_failure_surfaces_generic_error() {
    let app = setup_with(RecordingStore::failing(), &[]);

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/presign")
        .json(&json!({ "password": ADMIN_PASSWORD, "fileName": "thumb.jpg" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_delete_issues_single_store_call() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/naraddon-tube/assets/delete")
        .json(&json!({
            "password": ADMIN_PASSWORD,
            "objectKey": "naraddon-tube/thumbnails/1-abc-thumb.jpg"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(
        app.store.calls(),
        vec![StoreCall::Delete {
            key: "naraddon-tube/thumbnails/1-abc-thumb.jpg".into()
        }]
    );
}

#[tokio::test]
async fn test_delete_of_missing_key_still_succeeds() {
    let app = setup_with(RecordingStore::with_missing(&["gone.jpg"]), &[]);

    let response = app
        .client()
        .post("/api/expert-services/assets/delete")
        .json(&json!({ "password": ADMIN_PASSWORD, "objectKey": "gone.jpg" }))
        .await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_delete_rejects_bad_password_and_missing_key() {
    let app = setup_test_app();

    let unauthorized = app
        .client()
        .post("/api/expert-services/assets/delete")
        .json(&json!({ "password": "nope", "objectKey": "a.jpg" }))
        .await;
    assert_eq!(unauthorized.status_code(), 401);

    let missing_key = app
        .client()
        .post("/api/expert-services/assets/delete")
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .await;
    assert_eq!(missing_key.status_code(), 400);

    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_store_failure_is_server_error() {
    let app = setup_with(RecordingStore::failing(), &[]);

    let response = app
        .client()
        .post("/api/expert-services/assets/delete")
        .json(&json!({ "password": ADMIN_PASSWORD, "objectKey": "a.jpg" }))
        .await;

    assert_eq!(response.status_code(), 500);
}
