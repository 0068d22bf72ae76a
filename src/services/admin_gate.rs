//! Password gate for admin asset actions.
//!
//! Each area has one shared admin secret. The gate compares the caller's
//! secret against it and fails closed when the area has no secret at all.
//! Secrets are looked up through a `SecretProvider` so tests and other
//! deployments can supply their own.

use crate::models::policy::AssetPolicy;
use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, env, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("admin secret for `{0}` is not configured")]
    Unconfigured(String),
    #[error("password is required")]
    Missing,
    #[error("password is incorrect")]
    Denied,
}

/// Source of per-area admin secrets.
pub trait SecretProvider: Send + Sync {
    /// The configured secret for `area`, if any.
    fn secret(&self, area: &str) -> Option<String>;
}

/// Secrets resolved once at startup.
#[derive(Clone, Default)]
pub struct StaticSecrets {
    secrets: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new(secrets: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            secrets: secrets.into_iter().collect(),
        }
    }

    /// Read every policy's secret variable.
    ///
    /// A missing or empty variable is a startup error; there is no default.
    pub fn from_env(policies: &[AssetPolicy]) -> Result<Self> {
        Self::from_lookup(policies, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        policies: &[AssetPolicy],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut secrets = HashMap::new();
        let mut missing = Vec::new();
        for policy in policies {
            match lookup(&policy.secret_env) {
                Some(value) if !value.is_empty() => {
                    secrets.insert(policy.area.clone(), value);
                }
                _ => missing.push(policy.secret_env.as_str()),
            }
        }
        if !missing.is_empty() {
            bail!("missing admin secrets: {}", missing.join(", "));
        }
        Ok(Self { secrets })
    }
}

impl SecretProvider for StaticSecrets {
    fn secret(&self, area: &str) -> Option<String> {
        self.secrets.get(area).cloned()
    }
}

/// `true` only if `configured` is non-empty and `supplied` equals it exactly.
pub fn verify(supplied: &str, configured: &str) -> bool {
    !configured.is_empty() && supplied == configured
}

/// Cookie value proving a prior successful verify: hex SHA-256 of the secret.
pub fn access_cookie_value(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[derive(Clone)]
pub struct AdminGate {
    provider: Arc<dyn SecretProvider>,
}

impl AdminGate {
    pub fn new(provider: Arc<dyn SecretProvider>) -> Self {
        Self { provider }
    }

    /// The area's secret, or `Unconfigured` if it is unset or empty.
    pub fn configured_secret(&self, area: &str) -> Result<String, GateError> {
        match self.provider.secret(area) {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(GateError::Unconfigured(area.to_string())),
        }
    }

    /// Check a password. An absent password is denied, not rejected as missing.
    pub fn check(&self, area: &str, supplied: Option<&str>) -> Result<String, GateError> {
        let secret = self.configured_secret(area)?;
        match supplied {
            Some(supplied) if verify(supplied, &secret) => Ok(secret),
            _ => Err(GateError::Denied),
        }
    }

    /// Like [`check`](Self::check), but an absent password must be present.
    pub fn check_required(&self, area: &str, supplied: Option<&str>) -> Result<String, GateError> {
        let secret = self.configured_secret(area)?;
        match supplied {
            None | Some("") => Err(GateError::Missing),
            Some(supplied) if verify(supplied, &secret) => Ok(secret),
            Some(_) => Err(GateError::Denied),
        }
    }

    /// Accept either a trimmed password or a matching access cookie.
    ///
    /// A password, when given, takes precedence: a wrong one is denied even
    /// if the cookie would have matched.
    pub fn check_session(
        &self,
        area: &str,
        supplied: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<(), GateError> {
        let secret = self.configured_secret(area)?;
        let supplied = supplied.map(str::trim).filter(|s| !s.is_empty());
        let allowed = match supplied {
            Some(password) => verify(password, &secret),
            None => cookie.is_some_and(|value| value == access_cookie_value(&secret)),
        };
        if allowed { Ok(()) } else { Err(GateError::Denied) }
    }
}
