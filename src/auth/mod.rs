//! Authentication module
//!
//! Supports: Basic, Bearer (OAuth2 client credentials), Token
//!
//! `AuthenticationFactory` turns an auth type name and a credentials object
//! into an [`Authentication`]; authenticating yields an [`AuthSession`] whose
//! HTTP client already carries the auth headers.

mod authenticator;
mod types;

pub use authenticator::{
    Authentication, AuthenticationFactory, BasicAuthentication, BearerAuthentication,
    TokenAuthentication,
};
pub use types::{AuthSession, AuthType, BasicCredentials, BearerCredentials, TokenCredentials};

#[cfg(test)]
mod tests;
