//! Bounded-wait element interactions shared by every page object.
//!
//! Two families of operation:
//!
//! - **Actions** (`click`, `type_text`, `expect_state`, `goto`) must succeed
//!   for a test to continue. Failures are logged and returned.
//! - **Probes** (`is_enabled`, `is_hidden`, `is_visible`, `get_text`,
//!   `page_title`, `count_with_retry`) report state. Failures, timeouts
//!   included, are logged and turned into `false`, `""` or `0` so callers can
//!   branch on absence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::advisory::Advisory;
use crate::browser::locator::{ElementState, Locator};
use crate::browser::page::Page;
use crate::config::{UiSettings, DEFAULT_ELEMENT_WAIT};
use crate::error::{HarnessError, HarnessResult};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SCREENSHOT_DIR: &str = "test-results/screenshots";

/// Timeouts applied to every locator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Element state wait before acting or probing.
    pub timeout: Duration,
    /// Pause between polls of `count_with_retry`.
    pub poll_interval: Duration,
    /// Page load wait.
    pub navigation_timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_ELEMENT_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

impl WaitPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct ElementActions {
    page: Arc<dyn Page>,
    wait: WaitPolicy,
    screenshot_dir: PathBuf,
}

impl ElementActions {
    pub fn new(page: Arc<dyn Page>, wait: WaitPolicy) -> Self {
        Self {
            page,
            wait,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
        }
    }

    pub fn from_settings(page: Arc<dyn Page>, settings: &UiSettings) -> Self {
        Self::new(page, WaitPolicy::with_timeout(settings.element_wait))
            .with_screenshot_dir(settings.screenshot_dir.clone())
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        info!("Navigating to: {}", url);
        self.page.goto(url).await.map_err(|e| {
            error!("Navigation to {} failed: {}", url, e);
            e
        })
    }

    /// Wait for `locator` to be visible, then click it.
    pub async fn click(&self, locator: &Locator) -> HarnessResult<()> {
        let result = async {
            self.page.wait_for(locator, ElementState::Visible, self.wait.timeout).await?;
            self.page.click(locator).await
        }
        .await;

        result.map_err(|e| {
            error!("Failed to click on element {}. Error: {}", locator, e);
            e
        })
    }

    /// Clear the field, focus it again, then fill `value`. The end state does
    /// not depend on what the field held before.
    pub async fn type_text(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        let result = async {
            self.page.wait_for(locator, ElementState::Visible, self.wait.timeout).await?;
            self.page.clear(locator).await?;
            self.page.focus(locator).await?;
            self.page.fill(locator, value).await
        }
        .await;

        result.map_err(|e| {
            error!("Failed to type into element {}. Error: {}", locator, e);
            e
        })
    }

    /// Assertion-style wait: escalates if `state` is not reached in time.
    pub async fn expect_state(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        let timeout = timeout.unwrap_or(self.wait.timeout);
        self.page.wait_for(locator, state, timeout).await.map_err(|e| {
            error!("Element {} did not become {}. Error: {}", locator, state, e);
            e
        })
    }

    pub async fn wait_for_network_idle(&self) -> HarnessResult<()> {
        self.page
            .wait_for_network_idle(self.wait.navigation_timeout)
            .await
            .map_err(|e| {
                error!("Page did not settle. Error: {}", e);
                e
            })
    }

    pub async fn is_enabled(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(self.wait.timeout);
        let result = async {
            self.page.wait_for(locator, ElementState::Visible, timeout).await?;
            self.page.is_enabled(locator).await
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!("Element {} is not enabled. Error: {}", locator, e);
            false
        })
    }

    pub async fn is_hidden(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe_state(locator, ElementState::Hidden, timeout).await
    }

    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe_state(locator, ElementState::Visible, timeout).await
    }

    /// Text content of a visible element, optionally trimmed; `""` on failure.
    pub async fn get_text(&self, locator: &Locator, trim: bool) -> String {
        let result = async {
            self.page.wait_for(locator, ElementState::Visible, self.wait.timeout).await?;
            self.page.text_content(locator).await
        }
        .await;

        match result {
            Ok(text) => {
                let text = text.unwrap_or_default();
                if trim {
                    text.trim().to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                warn!("Could not read text of element {}. Error: {}", locator, e);
                String::new()
            }
        }
    }

    pub async fn page_title(&self) -> String {
        self.page.title().await.unwrap_or_else(|e| {
            warn!("Could not read page title. Error: {}", e);
            String::new()
        })
    }

    /// Count matches, polling up to `polls` times until the count is non-zero.
    /// Returns 0 when every poll came back empty.
    pub async fn count_with_retry(&self, locator: &Locator, polls: u32) -> usize {
        let polls = polls.max(1);
        for poll in 1..=polls {
            match self.page.count(locator).await {
                Ok(count) if count > 0 => {
                    info!("Total number of rows present in the table are: {}", count);
                    return count;
                }
                Ok(_) => info!("No rows for {} yet. Poll {} of {}", locator, poll, polls),
                Err(e) => warn!("Counting {} failed on poll {} of {}. Error: {}", locator, poll, polls, e),
            }
            if poll < polls {
                tokio::time::sleep(self.wait.poll_interval).await;
            }
        }
        0
    }

    /// Best-effort PNG capture into the screenshot directory.
    pub async fn capture_screenshot(&self, name: &str) -> Advisory<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = self.screenshot_dir.join(format!("{}-{}.png", name, stamp));

        let result = async {
            tokio::fs::create_dir_all(&self.screenshot_dir).await?;
            self.page.screenshot(&path).await?;
            Ok::<_, HarnessError>(path.clone())
        }
        .await;

        match &result {
            Ok(path) => info!("Screenshot saved to {}", path.display()),
            Err(e) => warn!("Screenshot capture failed. Error: {}", e),
        }
        Advisory::from_result(result)
    }

    async fn probe_state(&self, locator: &Locator, state: ElementState, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(self.wait.timeout);
        match self.page.wait_for(locator, state, timeout).await {
            Ok(()) => true,
            Err(e) => {
                if e.is_timeout() {
                    debug!("Element {} not {} within {} ms", locator, state, timeout.as_millis());
                } else {
                    warn!("Probe of {} failed. Error: {}", locator, e);
                }
                false
            }
        }
    }
}
