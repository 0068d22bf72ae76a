//! Test helpers: an in-memory object store that records every call, and a
//! router wired the same way `main` wires it.

#![allow(dead_code)]

use asset_gate::{
    models::policy::{PolicyRegistry, builtin_policies},
    routes::routes::routes,
    services::{
        admin_gate::{AdminGate, StaticSecrets},
        asset_service::AssetService,
        object_store::{
            DeleteOutcome, ObjectStore, PutOptions, StoreError, StoreResult, build_public_url,
        },
    },
};
use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Password configured for every area in tests.
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

pub const PUBLIC_BASE: &str = "https://cdn.example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Presign {
        key: String,
        content_type: String,
        ttl: Duration,
    },
    Put {
        key: String,
        size: usize,
        options: PutOptions,
    },
    Delete {
        key: String,
    },
}

#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    fail: bool,
    missing_keys: Vec<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the store were unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Deletes of these keys report `NotFound`.
    pub fn with_missing(keys: &[&str]) -> Self {
        Self {
            missing_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(StoreError::Request("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StoreResult<String> {
        self.record(StoreCall::Presign {
            key: key.to_string(),
            content_type: content_type.to_string(),
            ttl,
        })?;
        Ok(format!(
            "https://store.example.com/assets/{key}?X-Amz-Expires={}",
            ttl.as_secs()
        ))
    }

    async fn put_object(&self, key: &str, body: Bytes, options: &PutOptions) -> StoreResult<()> {
        self.record(StoreCall::Put {
            key: key.to_string(),
            size: body.len(),
            options: options.clone(),
        })
    }

    async fn delete_object(&self, key: &str) -> StoreResult<DeleteOutcome> {
        self.record(StoreCall::Delete {
            key: key.to_string(),
        })?;
        if self.missing_keys.iter().any(|k| k == key) {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }

    fn public_url(&self, key: &str) -> String {
        build_public_url(key, Some(PUBLIC_BASE), "", "")
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<RecordingStore>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Every builtin area enabled, all sharing `ADMIN_PASSWORD`.
pub fn setup_test_app() -> TestApp {
    setup_with(RecordingStore::new(), &[])
}

/// Like `setup_test_app`, but areas in `unconfigured` have no secret.
pub fn setup_with(store: RecordingStore, unconfigured: &[&str]) -> TestApp {
    let store = Arc::new(store);
    let server = build_server(Some(store.clone() as Arc<dyn ObjectStore>), unconfigured);
    TestApp { server, store }
}

/// App with no object store configured.
pub fn setup_without_store() -> TestServer {
    build_server(None, &[])
}

fn build_server(store: Option<Arc<dyn ObjectStore>>, unconfigured: &[&str]) -> TestServer {
    let policies = builtin_policies();
    let secrets = StaticSecrets::new(
        policies
            .iter()
            .filter(|p| !unconfigured.contains(&p.area.as_str()))
            .map(|p| (p.area.clone(), ADMIN_PASSWORD.to_string())),
    );
    let registry = PolicyRegistry::new(policies);
    let max_upload_bytes = registry.max_upload_bytes();
    let service = AssetService::new(
        store,
        AdminGate::new(Arc::new(secrets)),
        registry,
        "ttontok",
    );
    let app = routes(max_upload_bytes).with_state(service);
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// The single PUT recorded by `store`.
pub fn single_put(store: &RecordingStore) -> (String, usize, PutOptions) {
    match store.calls().as_slice() {
        [StoreCall::Put { key, size, options }] => (key.clone(), *size, options.clone()),
        calls => panic!("expected one PUT, got {calls:?}"),
    }
}

/// Value of metadata entry `name`.
pub fn metadata<'a>(options: &'a PutOptions, name: &str) -> Option<&'a str> {
    options
        .metadata
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Check `key` is `<prefix>/<digits>-<uuid>-<suffix>`.
pub fn assert_presign_key_shape(key: &str, prefix: &str, suffix: &str) {
    let rest = key
        .strip_prefix(&format!("{prefix}/"))
        .unwrap_or_else(|| panic!("{key} does not start with {prefix}/"));
    let (millis, rest) = rest.split_once('-').expect("missing millis segment");
    assert!(
        !millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()),
        "bad millis segment in {key}"
    );
    let (uuid, name) = rest.split_at(36);
    assert!(
        uuid.chars().all(|c| c.is_ascii_hexdigit() || c == '-'),
        "bad uuid segment in {key}"
    );
    assert_eq!(name, format!("-{suffix}"), "bad name segment in {key}");
}
