//! Authenticated REST calls against one Google service.

use crate::auth::Authenticator;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sheetbridge_core::{BridgeError, BridgeResult};

const USER_AGENT: &str = concat!("sheetbridge/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used by every sheetbridge component.
///
/// No request timeout is set; long uploads and queries wait as long as the
/// server takes.
pub fn build_client() -> BridgeResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| BridgeError::Http(e.to_string()))
}

/// Google JSON error envelope: `{"error": {"code": 404, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// REST helper bound to one service base URL.
///
/// Callers fetch a token once per operation with [`GoogleHttp::token`] and
/// pass it to every request of that operation.
#[derive(Debug, Clone)]
pub struct GoogleHttp {
    service: &'static str,
    base: Url,
    auth: Authenticator,
}

impl GoogleHttp {
    /// Create a helper for `service` rooted at `base_url`.
    pub fn new(service: &'static str, base_url: &str, auth: Authenticator) -> BridgeResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| BridgeError::Config(format!("invalid {service} URL {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Config(format!(
                "{service} URL {base_url} cannot be a base"
            )));
        }
        Ok(Self {
            service,
            base,
            auth,
        })
    }

    /// Service name used in errors and logs.
    #[must_use]
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Obtain a bearer token.
    pub async fn token(&self) -> BridgeResult<String> {
        self.auth.token().await
    }

    /// Base URL joined with percent-encoded path segments.
    #[must_use]
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start an authenticated request.
    pub fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.auth.client().request(method, url).bearer_auth(token)
    }

    /// Send a request; non-success statuses become [`BridgeError::Remote`].
    pub async fn send(&self, request: RequestBuilder) -> BridgeResult<Response> {
        let (client, request) = request.build_split();
        let request = request.map_err(|e| BridgeError::Http(e.to_string()))?;
        tracing::debug!("{} {} {}", self.service, request.method(), request.url());

        let response = client
            .execute(request)
            .await
            .map_err(|e| BridgeError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        Err(BridgeError::remote(self.service, status.as_u16(), message))
    }

    /// Send a request and decode the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> BridgeResult<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| BridgeError::Http(format!("Failed to parse JSON: {e}")))
    }

    /// Send a request and return the raw response body.
    pub async fn send_bytes(&self, request: RequestBuilder) -> BridgeResult<Vec<u8>> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BridgeError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Some(envelope.error.message);
    }
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}
