//! # E2E Harness
//!
//! Support library for end-to-end tests of an HR web application and an
//! adjacent payment REST API. It has two halves:
//!
//! ## API side
//!
//! The [`api`] module acquires an OAuth2 client-credentials token once per run,
//! persists it as session state on disk, and injects it into every request
//! made by [`api::ApiClient`] and the domain controllers built on it.
//!
//! ## Browser side
//!
//! The [`browser`] module wraps a [`browser::Page`] in bounded-wait
//! interactions, [`pages`] holds the page objects, and [`session`] drives the
//! interactive login with retry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use e2e_harness::browser::{ElementActions, WebDriverPage};
//! use e2e_harness::config::{BrowserSettings, ProcessEnv, UiSettings};
//! use e2e_harness::session::LoginOrchestrator;
//!
//! # async fn example() -> e2e_harness::HarnessResult<()> {
//! let ui = UiSettings::load(&ProcessEnv)?;
//! let page = WebDriverPage::connect(&BrowserSettings::load(&ProcessEnv), ui.base_url.clone()).await?;
//! let actions = ElementActions::from_settings(Arc::new(page), &ui);
//!
//! let mut login = LoginOrchestrator::from_settings(actions, &ui);
//! let dashboard = login.login().await?;
//! dashboard.click_on_sub_menu("PIM").await?;
//! # Ok(())
//! # }
//! ```

pub mod advisory;
pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod retry;
pub mod session;

pub use advisory::Advisory;
pub use error::{HarnessError, HarnessResult};
