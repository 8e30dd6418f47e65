//! One-time authentication before API suites run.
//!
//! Validates configuration, fetches a bearer token with bounded retry and
//! persists it so every later [`crate::api::ApiClient`] call can read it
//! instead of logging in again.

use reqwest::Client;
use tracing::{error, info};

use crate::api::session::{SessionState, SessionStore};
use crate::api::token::{acquire_token, BearerToken};
use crate::config::{ApiSettings, ConfigSource};
use crate::error::{HarnessError, HarnessResult};
use crate::retry::{RetryFailure, RetryPolicy};

pub struct AuthBootstrap {
    http: Client,
    settings: ApiSettings,
    store: SessionStore,
    policy: RetryPolicy,
}

impl AuthBootstrap {
    /// Bootstrap with the standard policy: 3 attempts, 1000 ms apart.
    pub fn new(settings: ApiSettings) -> Self {
        Self {
            http: Client::new(),
            store: SessionStore::new(settings.session_file.clone()),
            settings,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Acquire a token and overwrite the session file with it.
    pub async fn run(&self) -> HarnessResult<SessionState> {
        info!("Starting authentication to get bearer token.");

        let token = self.acquire_with_retry().await?;
        let state = SessionState::with_token(self.settings.base_url.clone(), token.into_inner());
        self.store.write(&state).await?;

        info!("Authentication state saved successfully to {}", self.store.path().display());
        Ok(state)
    }

    async fn acquire_with_retry(&self) -> HarnessResult<BearerToken> {
        let credentials = &self.settings.credentials;
        let result = self
            .policy
            .run("Bearer token retrieval", |_| acquire_token(&self.http, credentials))
            .await;

        match result {
            Ok(token) => {
                info!("Successfully retrieved bearer token.");
                Ok(token)
            }
            Err(RetryFailure::Exhausted { attempts, last }) => {
                let err = HarnessError::AuthExhausted {
                    attempts,
                    last: Box::new(last),
                };
                error!("{}. Verify client id, secret and API endpoints.", err);
                Err(err)
            }
            Err(RetryFailure::Aborted(e)) => Err(e),
        }
    }
}

/// Validate configuration from `source`, then run [`AuthBootstrap`] with the
/// standard policy. A missing key fails before any network call.
pub async fn bootstrap(source: &dyn ConfigSource) -> HarnessResult<SessionState> {
    let settings = ApiSettings::load(source)?;
    AuthBootstrap::new(settings).run().await
}
