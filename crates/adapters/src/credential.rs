// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Installation-token exchange for GitHub Apps.
//!
//! ```text
//! 1. sign an RS256 JWT with the app's private key (iss = client id or app id)
//! 2. POST {api}/app/installations/{installation}/access_tokens
//! 3. response.token is a short-lived credential scoped to the installation
//! ```
//!
//! One exchange per sync; tokens are never cached across jobs.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ag_core::TriggerServiceConfig;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default GitHub REST endpoint.
pub const GITHUB_API: &str = "https://api.github.com";

/// GitHub rejects app JWTs that live longer than 10 minutes.
const JWT_TTL: Duration = Duration::from_secs(9 * 60);

/// Backdate `iat` to tolerate clock drift between us and GitHub.
const JWT_BACKDATE: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid app private key: {0}")]
    InvalidKey(String),
    #[error("app credentials have neither a client id nor an app id")]
    MissingIssuer,
    #[error("failed to sign app token: {0}")]
    Signing(String),
    #[error("token request failed: {0}")]
    Http(String),
    #[error("token request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// App credentials as stored on the platform's trigger service.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub private_key: String,
}

impl AppCredentials {
    pub fn from_config(config: &TriggerServiceConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.secret.clone(),
            private_key: config.pem.clone(),
        }
    }

    /// JWT issuer: GitHub accepts the client id or the numeric app id.
    fn issuer(&self) -> Option<&str> {
        [self.client_id.as_str(), self.app_id.as_str()].into_iter().find(|s| !s.is_empty())
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// A short-lived installation access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iat: u64,
    exp: u64,
    iss: &'a str,
}

/// Sign the app JWT used to request installation tokens.
pub fn app_jwt(creds: &AppCredentials, now: SystemTime) -> Result<String, CredentialError> {
    let iss = creds.issuer().ok_or(CredentialError::MissingIssuer)?;
    let key = EncodingKey::from_rsa_pem(creds.private_key.as_bytes())
        .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;

    let now = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let claims = Claims {
        iat: now.saturating_sub(JWT_BACKDATE).as_secs(),
        exp: (now + JWT_TTL).as_secs(),
        iss,
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| CredentialError::Signing(e.to_string()))
}

/// Exchanges app credentials for an installation-scoped token.
#[async_trait]
pub trait TokenExchange: Clone + Send + Sync + 'static {
    async fn installation_token(
        &self,
        creds: &AppCredentials,
        installation_id: u64,
    ) -> Result<AccessToken, CredentialError>;
}

/// Token exchange against the GitHub REST API.
#[derive(Clone, Debug)]
pub struct GitHubTokenExchange {
    client: reqwest::Client,
    api_base: String,
}

impl GitHubTokenExchange {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), api_base }
    }

    fn token_url(&self, installation_id: u64) -> String {
        format!("{}/app/installations/{}/access_tokens", self.api_base, installation_id)
    }
}

impl Default for GitHubTokenExchange {
    fn default() -> Self {
        Self::new(GITHUB_API)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

#[async_trait]
impl TokenExchange for GitHubTokenExchange {
    async fn installation_token(
        &self,
        creds: &AppCredentials,
        installation_id: u64,
    ) -> Result<AccessToken, CredentialError> {
        let jwt = app_jwt(creds, SystemTime::now())?;

        tracing::info!(installation_id, app = ?creds.issuer(), "requesting installation token");
        let response = self
            .client
            .post(self.token_url(installation_id))
            .bearer_auth(jwt)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, concat!("agentd/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| CredentialError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(CredentialError::Rejected { status: status.as_u16(), message });
        }

        let body: TokenResponse =
            response.json().await.map_err(|e| CredentialError::Http(e.to_string()))?;
        Ok(AccessToken::new(body.token))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AccessToken, AppCredentials, CredentialError, TokenExchange};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FakeTokenState {
        /// `Err` holds the rejection message
        outcome: Result<String, String>,
        calls: Vec<u64>,
    }

    /// Fake token exchange for testing
    #[derive(Clone)]
    pub struct FakeTokenExchange {
        inner: Arc<Mutex<FakeTokenState>>,
    }

    impl FakeTokenExchange {
        /// Always succeeds with `token`
        pub fn granting(token: &str) -> Self {
            Self::with_outcome(Ok(token.to_string()))
        }

        /// Always fails with a 401 carrying `message`
        pub fn rejecting(message: &str) -> Self {
            Self::with_outcome(Err(message.to_string()))
        }

        fn with_outcome(outcome: Result<String, String>) -> Self {
            Self { inner: Arc::new(Mutex::new(FakeTokenState { outcome, calls: Vec::new() })) }
        }

        /// Installation ids tokens were requested for
        pub fn calls(&self) -> Vec<u64> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl TokenExchange for FakeTokenExchange {
        async fn installation_token(
            &self,
            _creds: &AppCredentials,
            installation_id: u64,
        ) -> Result<AccessToken, CredentialError> {
            let mut inner = self.inner.lock();
            inner.calls.push(installation_id);
            match &inner.outcome {
                Ok(token) => Ok(AccessToken::new(token.clone())),
                Err(message) => {
                    Err(CredentialError::Rejected { status: 401, message: message.clone() })
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTokenExchange;

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
