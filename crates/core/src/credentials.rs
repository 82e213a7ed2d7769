//! Google credentials.
//!
//! Three sources are supported, checked in this order by
//! [`Credentials::from_env`]:
//!
//! 1. `GOOGLE_OAUTH_ACCESS_TOKEN`: a ready-made bearer token.
//! 2. `GOOGLE_APPLICATION_CREDENTIALS`: path to a service-account JSON key.
//! 3. The GCE metadata server (when running on Google Cloud).
//!
//! Turning credentials into a bearer token is the job of the HTTP crate's
//! `Authenticator`; this module only loads and holds the secrets.

use crate::error::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Environment variable holding a static OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Environment variable holding the path to a service-account key file.
pub const KEY_FILE_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Service-account key, as found in the JSON file downloaded from the console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, used as the JWT issuer.
    pub client_email: String,
    /// RSA private key in PEM format.
    pub private_key: String,
    /// Token endpoint; the configured endpoint is used when absent.
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Parse a key from its JSON content.
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BridgeError::Auth(format!("invalid service account key: {e}")))
    }

    /// Read and parse a key file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Auth(format!(
                "cannot read service account key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum Credentials {
    /// A token obtained elsewhere, sent as-is.
    AccessToken(String),
    /// Exchange a signed JWT for a token at the OAuth endpoint.
    ServiceAccount(ServiceAccountKey),
    /// Ask the GCE metadata server for the instance's token.
    MetadataServer,
}

impl Credentials {
    /// Resolve credentials from the process environment.
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.is_empty()) {
            tracing::debug!("Using access token from {ACCESS_TOKEN_ENV}");
            return Ok(Self::AccessToken(token));
        }
        if let Some(path) = lookup(KEY_FILE_ENV).filter(|p| !p.is_empty()) {
            tracing::debug!("Using service account key {path}");
            return Ok(Self::ServiceAccount(ServiceAccountKey::from_file(path)?));
        }
        tracing::debug!("No explicit credentials, falling back to the metadata server");
        Ok(Self::MetadataServer)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            Self::MetadataServer => f.write_str("MetadataServer"),
        }
    }
}
