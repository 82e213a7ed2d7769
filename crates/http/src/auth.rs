//! Bearer tokens from [`Credentials`].
//!
//! Service-account keys are exchanged with the OAuth2 JWT bearer grant:
//! a JWT signed with the key's RSA private key is posted to the token
//! endpoint, which answers with a short-lived access token. On Google Cloud
//! the metadata server hands out the instance's token directly.
//!
//! Tokens are not cached; every call asks again.

use crate::client::build_client;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sheetbridge_core::{ApiEndpoints, BridgeError, BridgeResult, Credentials, ServiceAccountKey};
use std::time::{SystemTime, UNIX_EPOCH};

/// OAuth scopes requested for every token.
pub const SCOPES: &str = "https://www.googleapis.com/auth/drive \
https://www.googleapis.com/auth/spreadsheets \
https://www.googleapis.com/auth/bigquery";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_LIFETIME_SECS: u64 = 3600;

/// JWT claims for the Google OAuth2 bearer grant.
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Token endpoint and metadata server response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Turns credentials into bearer tokens.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: Client,
    credentials: Credentials,
    token_endpoint: String,
    metadata_endpoint: String,
}

impl Authenticator {
    /// Create an authenticator for the given credentials.
    pub fn new(credentials: Credentials, endpoints: &ApiEndpoints) -> BridgeResult<Self> {
        Ok(Self {
            client: build_client()?,
            credentials,
            token_endpoint: endpoints.token.clone(),
            metadata_endpoint: endpoints.metadata.trim_end_matches('/').to_string(),
        })
    }

    /// The HTTP client shared with the service clients.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Obtain a bearer token.
    pub async fn token(&self) -> BridgeResult<String> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::ServiceAccount(key) => self.exchange_jwt(key).await,
            Credentials::MetadataServer => self.metadata_token().await,
        }
    }

    async fn exchange_jwt(&self, key: &ServiceAccountKey) -> BridgeResult<String> {
        let token_uri = key.token_uri.as_deref().unwrap_or(&self.token_endpoint);
        let assertion = sign_assertion(key, token_uri, unix_now()?)?;

        tracing::debug!("Exchanging JWT for {} at {token_uri}", key.client_email);
        let response = self
            .client
            .post(token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| BridgeError::Auth(format!("token request failed: {e}")))?;

        read_token(response).await
    }

    async fn metadata_token(&self) -> BridgeResult<String> {
        let url = format!("{}{METADATA_TOKEN_PATH}", self.metadata_endpoint);
        tracing::debug!("Requesting token from metadata server");
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| BridgeError::Auth(format!("metadata server unreachable: {e}")))?;

        read_token(response).await
    }
}

/// Sign the JWT assertion for `key`, valid for one hour from `now`.
fn sign_assertion(key: &ServiceAccountKey, audience: &str, now: u64) -> BridgeResult<String> {
    let claims = JwtClaims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: audience,
        iat: now,
        exp: now + JWT_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| BridgeError::Auth(format!("invalid private key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| BridgeError::Auth(format!("cannot sign assertion: {e}")))
}

async fn read_token(response: reqwest::Response) -> BridgeResult<String> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(BridgeError::Auth(format!(
            "token exchange failed ({status}): {text}"
        )));
    }
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| BridgeError::Auth(format!("malformed token response: {e}")))?;
    Ok(token.access_token)
}

fn unix_now() -> BridgeResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| BridgeError::Auth(format!("system clock before epoch: {e}")))
}
