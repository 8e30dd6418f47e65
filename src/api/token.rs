//! OAuth2 client-credentials token exchange.
//!
//! One call, no retry. [`crate::api::bootstrap`] decides how often to try.

use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use tracing::{debug, error, info};

use crate::api::types::TokenResponse;
use crate::config::Credentials;
use crate::error::{HarnessError, HarnessResult};
use crate::logging::redact;

const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque bearer credential. Not tracked for expiry; valid for the run.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({})", redact(&self.0))
    }
}

/// `Basic base64(id:secret)` header value.
pub fn basic_authorization(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Exchange client credentials for a bearer token.
pub async fn acquire_token(http: &Client, credentials: &Credentials) -> HarnessResult<BearerToken> {
    debug!("Requesting bearer token from: {}", credentials.token_url);

    let response = http
        .post(&credentials.token_url)
        .header(header::AUTHORIZATION, basic_authorization(credentials))
        .form(&[("grant_type", "client_credentials")])
        .timeout(TOKEN_REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            error!("Network error during token request: {}", e);
            HarnessError::Auth(format!("could not reach {}: {}", credentials.token_url, e))
        })?;

    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        error!("Token request failed with status {}", status);
        return Err(HarnessError::Auth(format!("{} {}", status.as_u16(), reason)));
    }

    let body: TokenResponse = response.json().await.map_err(|e| {
        error!("Failed to parse token response: {}", e);
        HarnessError::Auth(format!("invalid token response: {}", e))
    })?;

    match body.access_token.filter(|t| !t.is_empty()) {
        Some(token) => {
            info!("Received bearer token: {}", redact(&token));
            Ok(BearerToken(token))
        }
        None => {
            error!("Token response did not contain an access_token");
            Err(HarnessError::Auth("response has no access_token".to_string()))
        }
    }
}
