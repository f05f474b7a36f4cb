//! Authentication implementations and the factory that selects them

use super::types::{
    AuthSession, AuthType, BasicCredentials, BearerCredentials, TokenCredentials,
};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Something that can produce an authenticated session
#[async_trait]
pub trait Authentication: Send + Sync {
    /// Which kind of authentication this is
    fn auth_type(&self) -> AuthType;

    /// Perform the authentication and build the session
    async fn authenticate(&self) -> Result<AuthSession>;
}

fn sensitive_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| Error::auth(format!("Invalid header value: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Authorization, Accept and Content-Type headers for a bearer token
fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, sensitive_header(&format!("Bearer {token}"))?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn session_from_headers(
    headers: HeaderMap,
    expires_at: Option<DateTime<Utc>>,
    accept_invalid_certs: bool,
) -> Result<AuthSession> {
    let client = Client::builder()
        .default_headers(headers.clone())
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?;
    Ok(AuthSession::new(client, headers, expires_at))
}

// ============================================================================
// Basic
// ============================================================================

/// HTTP Basic authentication.
///
/// Certificate verification is disabled on the resulting session, as the
/// basic-auth endpoints this targets commonly sit behind self-signed certs.
#[derive(Debug, Clone)]
pub struct BasicAuthentication {
    user: String,
    password: String,
}

impl BasicAuthentication {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Authentication for BasicAuthentication {
    fn auth_type(&self) -> AuthType {
        AuthType::Basic
    }

    async fn authenticate(&self) -> Result<AuthSession> {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.user, self.password));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, sensitive_header(&format!("Basic {encoded}"))?);

        debug!(user = %self.user, "Configured basic authentication");
        session_from_headers(headers, None, true)
    }
}

// ============================================================================
// Bearer (OAuth2 client credentials)
// ============================================================================

/// OAuth2 client-credentials flow; the fetched token becomes a bearer header
#[derive(Debug, Clone)]
pub struct BearerAuthentication {
    client_id: String,
    client_secret: String,
    token_url: Url,
    scopes: Vec<String>,
    http_client: Client,
}

impl BearerAuthentication {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: Url::parse(token_url)?,
            scopes: Vec::new(),
            http_client: Client::new(),
        })
    }

    /// Request these scopes with the token
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Use a custom HTTP client for the token request
    #[must_use]
    pub fn with_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    async fn fetch_token(&self) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        if !self.scopes.is_empty() {
            form.push(("scope", self.scopes.join(" ")));
        }

        let response = self
            .http_client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Authentication for BearerAuthentication {
    fn auth_type(&self) -> AuthType {
        AuthType::Bearer
    }

    async fn authenticate(&self) -> Result<AuthSession> {
        let token = self.fetch_token().await?;
        let expires_at = token
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        debug!(token_url = %self.token_url, ?expires_at, "Fetched bearer token");
        session_from_headers(bearer_headers(&token.access_token)?, expires_at, false)
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

// ============================================================================
// Token
// ============================================================================

/// A pre-issued access token sent as a bearer token
#[derive(Debug, Clone)]
pub struct TokenAuthentication {
    access_token: String,
}

impl TokenAuthentication {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl Authentication for TokenAuthentication {
    fn auth_type(&self) -> AuthType {
        AuthType::Token
    }

    async fn authenticate(&self) -> Result<AuthSession> {
        session_from_headers(bearer_headers(&self.access_token)?, None, false)
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Picks the authentication implementation for a type name
pub struct AuthenticationFactory;

impl AuthenticationFactory {
    /// Build an authentication from its type name and credentials.
    ///
    /// - `basic`: `user` (or `username`), `password`
    /// - `bearer`: `client_id`, `client_secret`, `token_url`, optional `scopes`
    /// - `token`: `access_token`
    pub fn get(auth_type: &str, credentials: &JsonObject) -> Result<Box<dyn Authentication>> {
        let auth_type: AuthType = auth_type.parse()?;

        let auth: Box<dyn Authentication> = match auth_type {
            AuthType::Basic => {
                let creds: BasicCredentials = parse_credentials(auth_type, credentials)?;
                Box::new(BasicAuthentication::new(creds.user, creds.password))
            }
            AuthType::Bearer => {
                let creds: BearerCredentials = parse_credentials(auth_type, credentials)?;
                Box::new(
                    BearerAuthentication::new(
                        creds.client_id,
                        creds.client_secret,
                        &creds.token_url,
                    )?
                    .with_scopes(creds.scopes),
                )
            }
            AuthType::Token => {
                let creds: TokenCredentials = parse_credentials(auth_type, credentials)?;
                Box::new(TokenAuthentication::new(creds.access_token))
            }
        };

        Ok(auth)
    }
}

fn parse_credentials<T: DeserializeOwned>(auth_type: AuthType, credentials: &JsonObject) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(credentials.clone())).map_err(|e| {
        Error::invalid_value(
            "credentials",
            format!("invalid credentials for {auth_type} authentication: {e}"),
        )
    })
}
