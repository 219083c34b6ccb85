//! Request Authentication
//!
//! Authenticators decorate outbound requests with credentials. One is chosen
//! at startup from configuration and shared by the HTTP clients; `NoneAuth`
//! is the default when nothing is configured.

use std::sync::Arc;

use clap::ValueEnum;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decorating a request with credentials
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential cannot be encoded as an HTTP header value
    #[error("credential is not a valid header value")]
    InvalidCredential,

    /// Any other authenticator failure
    #[error("authentication failed: {0}")]
    Failed(String),
}

/// Supported authentication strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Static bearer token read from `API_KEY`
    #[value(name = "apikey")]
    ApiKey,
    /// No credentials
    #[default]
    None,
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthType::ApiKey => write!(f, "apikey"),
            AuthType::None => write!(f, "none"),
        }
    }
}

/// Decorates an outbound request with credentials
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError>;
}

/// Sends requests unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAuth;

impl Authenticator for NoneAuth {
    fn authenticate(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        Ok(request)
    }
}

/// Adds `Authorization: Bearer <token>` to every request
#[derive(Clone)]
pub struct ApiKeyAuth {
    header: HeaderValue,
}

impl ApiKeyAuth {
    pub fn new(token: &str) -> Result<Self, AuthError> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AuthError::InvalidCredential)?;
        header.set_sensitive(true);

        Ok(Self { header })
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth").field("header", &"<redacted>").finish()
    }
}

impl Authenticator for ApiKeyAuth {
    fn authenticate(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        Ok(request.header(AUTHORIZATION, self.header.clone()))
    }
}

/// Build the authenticator for the configured strategy
pub fn build_authenticator(
    auth_type: AuthType,
    token: &str,
) -> Result<Arc<dyn Authenticator>, AuthError> {
    match auth_type {
        AuthType::ApiKey => Ok(Arc::new(ApiKeyAuth::new(token)?)),
        AuthType::None => Ok(Arc::new(NoneAuth)),
    }
}
