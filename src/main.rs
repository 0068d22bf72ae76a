use anyhow::{Context, Result};
use asset_gate::{
    config::AppConfig,
    models::policy::PolicyRegistry,
    routes::routes::routes,
    services::{
        admin_gate::{AdminGate, StaticSecrets},
        asset_service::AssetService,
        object_store::{ObjectStore, S3ObjectStore},
    },
};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting asset-gate with config: {:?}", cfg);

    // --- Admin secrets (mandatory for every enabled area) ---
    let secrets = StaticSecrets::from_env(&cfg.policies)?;
    let gate = AdminGate::new(Arc::new(secrets));

    // --- Object store ---
    let store: Option<Arc<dyn ObjectStore>> = match cfg.store.clone() {
        Some(settings) => {
            let store = S3ObjectStore::new(settings).context("initializing object store")?;
            tracing::info!(bucket = %store.settings().bucket, "object store configured");
            Some(Arc::new(store) as Arc<dyn ObjectStore>)
        }
        None => {
            tracing::warn!("object storage is not configured; storage routes will answer 503");
            None
        }
    };

    // --- Initialize core service ---
    let policies = PolicyRegistry::new(cfg.policies.clone());
    let max_upload_bytes = policies.max_upload_bytes();
    let service = AssetService::new(store, gate, policies, cfg.public_upload_area.clone());

    // --- Build router ---
    let app: Router = routes(max_upload_bytes).with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
