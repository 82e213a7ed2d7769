//! Token acquisition tests against mock OAuth and metadata endpoints.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use sheetbridge_core::{ApiEndpoints, BridgeError, Credentials, ServiceAccountKey};
use sheetbridge_http::{Authenticator, SCOPES};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/test_key.pub.pem");

#[derive(Debug, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

fn service_account(token_uri: Option<String>) -> Credentials {
    Credentials::ServiceAccount(ServiceAccountKey {
        client_email: "loader@demo.iam.gserviceaccount.com".to_string(),
        private_key: PRIVATE_KEY.to_string(),
        token_uri,
    })
}

fn assertion_from(body: &[u8]) -> String {
    let body = String::from_utf8_lossy(body);
    body.split('&')
        .find_map(|pair| pair.strip_prefix("assertion="))
        .expect("assertion field")
        .to_string()
}

#[tokio::test]
async fn test_service_account_jwt_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("jwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.minted",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = ApiEndpoints::single(&server.uri());
    let auth = Authenticator::new(service_account(None), &endpoints).unwrap();
    assert_eq!(auth.token().await.unwrap(), "ya29.minted");

    let requests = server.received_requests().await.unwrap();
    let assertion = assertion_from(&requests[0].body);

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[endpoints.token.as_str()]);
    let claims = decode::<Claims>(
        &assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.iss, "loader@demo.iam.gserviceaccount.com");
    assert_eq!(claims.scope, SCOPES);
    assert_eq!(claims.aud, endpoints.token);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_key_token_uri_takes_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/v4/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "k"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token_uri = format!("{}/oauth2/v4/token", server.uri());
    let auth = Authenticator::new(
        service_account(Some(token_uri)),
        &ApiEndpoints::single("http://127.0.0.1:9"),
    )
    .unwrap();
    assert_eq!(auth.token().await.unwrap(), "k");
}

#[tokio::test]
async fn test_rejected_exchange_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let auth =
        Authenticator::new(service_account(None), &ApiEndpoints::single(&server.uri())).unwrap();
    let err = auth.token().await.unwrap_err();
    match err {
        BridgeError::Auth(message) => assert!(message.contains("invalid_grant")),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_metadata_server_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.instance",
            "expires_in": 1800,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth =
        Authenticator::new(Credentials::MetadataServer, &ApiEndpoints::single(&server.uri()))
            .unwrap();
    assert_eq!(auth.token().await.unwrap(), "ya29.instance");
}

#[tokio::test]
async fn test_tokens_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "t"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let auth =
        Authenticator::new(Credentials::MetadataServer, &ApiEndpoints::single(&server.uri()))
            .unwrap();
    auth.token().await.unwrap();
    auth.token().await.unwrap();
}
