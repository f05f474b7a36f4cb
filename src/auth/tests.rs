//! Tests for the auth module

use super::*;
use crate::error::Error;
use crate::types::JsonObject;
use base64::Engine;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(value: serde_json::Value) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

// ============================================================================
// Factory Tests
// ============================================================================

#[test]
fn test_factory_selects_implementation() {
    let basic = AuthenticationFactory::get(
        "basic",
        &credentials(json!({"user": "isearch", "password": "basic_auth_pw"})),
    )
    .unwrap();
    assert_eq!(basic.auth_type(), AuthType::Basic);

    let bearer = AuthenticationFactory::get(
        "bearer",
        &credentials(json!({
            "client_id": "id",
            "client_secret": "secret",
            "token_url": "https://auth.example.com/oauth/token"
        })),
    )
    .unwrap();
    assert_eq!(bearer.auth_type(), AuthType::Bearer);

    let token =
        AuthenticationFactory::get("token", &credentials(json!({"access_token": "abc"}))).unwrap();
    assert_eq!(token.auth_type(), AuthType::Token);
}

#[test]
fn test_factory_invalid_type() {
    let result = AuthenticationFactory::get("test", &JsonObject::new());
    let err = result.err().expect("unknown auth type must fail");
    assert!(err.is_fatal_config());
    assert!(err.to_string().contains("Authentication (test) type invalid"));
}

#[test]
fn test_factory_missing_credentials() {
    let result = AuthenticationFactory::get("basic", &credentials(json!({"user": "only"})));
    match result.err() {
        Some(Error::InvalidConfigValue { field, message }) => {
            assert_eq!(field, "credentials");
            assert!(message.contains("password"));
        }
        other => panic!("Expected InvalidConfigValue, got {other:?}"),
    }
}

#[test]
fn test_factory_bad_token_url() {
    let result = AuthenticationFactory::get(
        "bearer",
        &credentials(json!({
            "client_id": "id",
            "client_secret": "secret",
            "token_url": "not a url"
        })),
    );
    assert!(matches!(result.err(), Some(Error::InvalidUrl(_))));
}

#[test]
fn test_factory_accepts_username_alias() {
    let auth = AuthenticationFactory::get(
        "basic",
        &credentials(json!({"username": "u", "password": "p"})),
    );
    assert!(auth.is_ok());
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_basic_session_headers() {
    let auth = BasicAuthentication::new("isearch", "basic_auth_pw");
    let session = auth.authenticate().await.unwrap();

    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("isearch:basic_auth_pw")
    );
    assert_eq!(session.header("authorization"), Some(expected.as_str()));
    assert!(session.expires_at().is_none());
}

#[tokio::test]
async fn test_token_session_headers() {
    let session = TokenAuthentication::new("tok-123")
        .authenticate()
        .await
        .unwrap();

    assert_eq!(session.header("authorization"), Some("Bearer tok-123"));
    assert_eq!(session.header("accept"), Some("application/json"));
    assert_eq!(session.header("content-type"), Some("application/json"));
    assert_eq!(session.headers().len(), 3);
}

#[tokio::test]
async fn test_bearer_fetches_token() {
    let mock_server = MockServer::start().await;
    let token = "54692028ran1595eebed1765ec691ca04b";

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 7200,
            "scope": "users.read"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = BearerAuthentication::new(
        "my-client",
        "my-secret",
        &format!("{}/oauth/token", mock_server.uri()),
    )
    .unwrap();

    let session = auth.authenticate().await.unwrap();
    let expected = format!("Bearer {token}");
    assert_eq!(session.header("authorization"), Some(expected.as_str()));
    assert_eq!(session.header("accept"), Some("application/json"));
    assert!(session.expires_at().is_some());
    assert!(!session.is_expired());
}

#[tokio::test]
async fn test_bearer_sends_scopes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("scope=read+write"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = BearerAuthentication::new("id", "secret", &format!("{}/token", mock_server.uri()))
        .unwrap()
        .with_scopes(vec!["read".to_string(), "write".to_string()]);

    let session = auth.authenticate().await.unwrap();
    assert_eq!(session.header("authorization"), Some("Bearer t"));
}

#[tokio::test]
async fn test_bearer_token_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&mock_server)
        .await;

    let auth = BearerAuthentication::new(
        "id",
        "wrong",
        &format!("{}/oauth/token", mock_server.uri()),
    )
    .unwrap();

    match auth.authenticate().await {
        Err(Error::OAuth2 { message }) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid_client"));
        }
        other => panic!("Expected OAuth2 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_client_sends_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/items"))
        .and(header("Authorization", "Bearer preset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = TokenAuthentication::new("preset")
        .authenticate()
        .await
        .unwrap();

    let response = session
        .client()
        .get(format!("{}/api/items", mock_server.uri()))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}
