//! Interactive login with retry and "already logged in" detection.

use tracing::{error, info};

use crate::browser::{ElementActions, ElementState};
use crate::config::{UiSettings, APP_PASSWORD, APP_USER_NAME};
use crate::error::{HarnessError, HarnessResult};
use crate::pages::{DashboardPage, LoginPage};
use crate::retry::{RetryFailure, RetryPolicy};

const FAILURE_SCREENSHOT: &str = "login-failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Unauthenticated,
    Checking,
    AlreadyAuthenticated,
    LoggingIn { attempt: u32 },
    Authenticated,
    Failed,
}

pub struct LoginOrchestrator {
    actions: ElementActions,
    login_page: LoginPage,
    dashboard: DashboardPage,
    username: Option<String>,
    password: Option<String>,
    policy: RetryPolicy,
    transitions: Vec<LoginState>,
}

impl LoginOrchestrator {
    pub fn new(actions: ElementActions, username: Option<String>, password: Option<String>) -> Self {
        Self {
            login_page: LoginPage::new(actions.clone()),
            dashboard: DashboardPage::new(actions.clone()),
            actions,
            username,
            password,
            policy: RetryPolicy::default(),
            transitions: vec![LoginState::Unauthenticated],
        }
    }

    pub fn from_settings(actions: ElementActions, settings: &UiSettings) -> Self {
        Self::new(actions, settings.username.clone(), settings.password.clone())
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> LoginState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(LoginState::Unauthenticated)
    }

    /// Every state entered during the latest `login` call, oldest first.
    pub fn transitions(&self) -> &[LoginState] {
        &self.transitions
    }

    /// Number of form submissions made.
    pub fn attempts(&self) -> u32 {
        self.transitions
            .iter()
            .filter(|s| matches!(s, LoginState::LoggingIn { .. }))
            .count() as u32
    }

    pub fn login_page(&self) -> &LoginPage {
        &self.login_page
    }

    pub fn dashboard(&self) -> &DashboardPage {
        &self.dashboard
    }

    /// Reach the dashboard, logging in only when it is not already shown.
    pub async fn login(&mut self) -> HarnessResult<DashboardPage> {
        self.transitions = vec![LoginState::Unauthenticated];
        let (username, password) = self.credentials()?;

        self.transitions.push(LoginState::Checking);
        if let Err(e) = self.actions.goto("/").await {
            error!("Could not open the application. Error: {}", e);
            return Err(self.fail(e).await);
        }
        if self.dashboard.is_displayed().await {
            info!("Session already authenticated, skipping login form.");
            self.transitions.push(LoginState::AlreadyAuthenticated);
            self.transitions.push(LoginState::Authenticated);
            return Ok(self.dashboard.clone());
        }

        let policy = self.policy;
        let actions = &self.actions;
        let login_page = &self.login_page;
        let header = self.dashboard.header();
        let transitions = &mut self.transitions;
        let (username, password) = (username.as_str(), password.as_str());

        let outcome = policy
            .run("UI login", |attempt| {
                transitions.push(LoginState::LoggingIn { attempt });
                async move {
                    actions.goto("/").await?;
                    login_page.login(username, password).await?;
                    actions.expect_state(header, ElementState::Visible, None).await
                }
            })
            .await;

        match outcome {
            Ok(()) => {
                info!("Logged in as {}", username);
                self.transitions.push(LoginState::Authenticated);
                Ok(self.dashboard.clone())
            }
            Err(failure) => {
                let (attempts, last) = match failure {
                    RetryFailure::Exhausted { attempts, last } => (attempts, last),
                    RetryFailure::Aborted(last) => (self.attempts(), last),
                };
                error!("Login failed after {} attempts. Last error: {}", attempts, last);
                Err(self
                    .fail(HarnessError::LoginExhausted {
                        attempts,
                        last: Box::new(last),
                    })
                    .await)
            }
        }
    }

    /// Enter `Failed` and take the diagnostic screenshot before handing `err` back.
    async fn fail(&mut self, err: HarnessError) -> HarnessError {
        self.transitions.push(LoginState::Failed);
        // advisory: a failed capture must not mask the login error
        let _ = self.actions.capture_screenshot(FAILURE_SCREENSHOT).await;
        err
    }

    fn credentials(&self) -> HarnessResult<(String, String)> {
        let username = self
            .username
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing(APP_USER_NAME))?;
        let password = self
            .password
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing(APP_PASSWORD))?;
        Ok((username, password))
    }
}

fn missing(key: &str) -> HarnessError {
    error!("{} is not set. Please set it before running the tests.", key);
    HarnessError::config(key)
}
