use crate::{
    models::policy::{AssetPolicy, builtin_policies},
    services::object_store::StoreSettings,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` when storage credentials are incomplete; store routes answer 503.
    pub store: Option<StoreSettings>,
    /// Enabled content areas.
    pub policies: Vec<AssetPolicy>,
    /// Area whose prefix and limits the public `/api/upload` uses.
    pub public_upload_area: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Presigned upload gateway for site assets")]
pub struct Args {
    /// Host to bind to (overrides ASSET_GATE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ASSET_GATE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Comma-separated content areas to enable (overrides ASSET_AREAS)
    #[arg(long)]
    pub areas: Option<String>,

    /// Area used by the public upload route (overrides PUBLIC_UPLOAD_AREA)
    #[arg(long)]
    pub public_upload_area: Option<String>,

    /// Public base URL of stored objects (overrides CLOUDFLARE_R2_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge CLI args over values from `lookup` over defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_host = lookup("ASSET_GATE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match lookup("ASSET_GATE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ASSET_GATE_PORT value `{}`", value))?,
            None => 3000,
        };

        let mut policies = builtin_policies();
        if let Some(areas) = args.areas.clone().or_else(|| lookup("ASSET_AREAS")) {
            let wanted: Vec<&str> = areas
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            if let Some(unknown) = wanted
                .iter()
                .find(|area| !policies.iter().any(|p| p.area == **area))
            {
                bail!("unknown content area `{}` in ASSET_AREAS", unknown);
            }
            policies.retain(|p| wanted.contains(&p.area.as_str()));
        }

        if let Some(overrides) = lookup("ASSET_PRESIGN_TTLS") {
            apply_ttl_overrides(&mut policies, &overrides)?;
        }

        let public_upload_area = args
            .public_upload_area
            .or_else(|| lookup("PUBLIC_UPLOAD_AREA"))
            .unwrap_or_else(|| "ttontok".into());
        if !policies.iter().any(|p| p.area == public_upload_area) {
            bail!(
                "public upload area `{}` is not an enabled content area",
                public_upload_area
            );
        }

        let public_base_url = args
            .public_base_url
            .or_else(|| lookup("CLOUDFLARE_R2_PUBLIC_BASE_URL"))
            .filter(|v| !v.is_empty());
        let store = store_settings(&lookup, public_base_url);

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            store,
            policies,
            public_upload_area,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage settings, present only when endpoint, both keys and the bucket are set.
fn store_settings(
    lookup: &impl Fn(&str) -> Option<String>,
    public_base_url: Option<String>,
) -> Option<StoreSettings> {
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let endpoint = get("CLOUDFLARE_R2_ENDPOINT");
    let access_key = get("CLOUDFLARE_R2_ACCESS_KEY_ID");
    let secret_key = get("CLOUDFLARE_R2_SECRET_ACCESS_KEY");
    let bucket = get("CLOUDFLARE_R2_BUCKET");

    match (endpoint, access_key, secret_key, bucket) {
        (Some(endpoint), Some(access_key), Some(secret_key), Some(bucket)) => Some(StoreSettings {
            endpoint,
            region: get("CLOUDFLARE_R2_REGION").unwrap_or_else(|| "auto".into()),
            access_key,
            secret_key,
            bucket,
            public_base_url,
        }),
        (None, None, None, None) => None,
        _ => {
            tracing::warn!("object storage settings are incomplete; storage routes will answer 503");
            None
        }
    }
}

/// Apply `area=secs,area=secs` presign TTL overrides.
fn apply_ttl_overrides(policies: &mut [AssetPolicy], overrides: &str) -> Result<()> {
    for entry in overrides.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (area, secs) = entry
            .split_once('=')
            .with_context(|| format!("expected `area=seconds` in ASSET_PRESIGN_TTLS, got `{}`", entry))?;
        let secs: u64 = secs
            .trim()
            .parse()
            .with_context(|| format!("parsing presign TTL for `{}`", area))?;
        if secs == 0 {
            bail!("presign TTL for `{}` must be positive", area);
        }
        if let Some(policy) = policies.iter_mut().find(|p| p.area == area.trim()) {
            policy.presign_ttl = Duration::from_secs(secs);
        }
    }
    Ok(())
}
