//! Auth types
//!
//! The authentication kinds the factory understands, the credential shapes
//! each one expects, and the session every kind produces.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported authentication kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// HTTP Basic (user + password)
    Basic,
    /// OAuth2 client credentials, exchanged for a bearer token
    Bearer,
    /// Pre-issued access token sent as a bearer token
    Token,
}

impl AuthType {
    /// Lowercase name used in configs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bearer => "bearer",
            Self::Token => "token",
        }
    }
}

impl FromStr for AuthType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(Self::Basic),
            "bearer" => Ok(Self::Bearer),
            "token" => Ok(Self::Token),
            other => Err(Error::config(format!(
                "Authentication ({other}) type invalid"
            ))),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials for [`AuthType::Basic`]
#[derive(Debug, Clone, Deserialize)]
pub struct BasicCredentials {
    #[serde(alias = "username")]
    pub user: String,
    pub password: String,
}

/// Credentials for [`AuthType::Bearer`]
#[derive(Debug, Clone, Deserialize)]
pub struct BearerCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Credentials for [`AuthType::Token`]
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCredentials {
    pub access_token: String,
}

/// An authenticated transport session.
///
/// The client carries the auth headers as defaults, so every request sent
/// through it is authenticated.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: Client,
    headers: HeaderMap,
    expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub(crate) fn new(client: Client, headers: HeaderMap, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            client,
            headers,
            expires_at,
        }
    }

    /// HTTP client with the session headers preset
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Headers applied to every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up one session header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// When the session credentials expire, if known
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the session is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
