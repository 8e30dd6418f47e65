//! The browser-control capability the harness builds on.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::locator::{ElementState, Locator};
use crate::error::HarnessResult;

/// A live browser page. Implementations resolve locators at call time and
/// report an elapsed wait as `HarnessError::InteractionTimeout`.
///
/// Actions other than [`Page::wait_for`] do not wait; callers wait first.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate; relative URLs resolve against the application base URL.
    async fn goto(&self, url: &str) -> HarnessResult<()>;

    async fn wait_for(&self, locator: &Locator, state: ElementState, timeout: Duration) -> HarnessResult<()>;

    async fn click(&self, locator: &Locator) -> HarnessResult<()>;

    async fn clear(&self, locator: &Locator) -> HarnessResult<()>;

    async fn focus(&self, locator: &Locator) -> HarnessResult<()>;

    async fn fill(&self, locator: &Locator, value: &str) -> HarnessResult<()>;

    async fn text_content(&self, locator: &Locator) -> HarnessResult<Option<String>>;

    async fn is_enabled(&self, locator: &Locator) -> HarnessResult<bool>;

    /// Number of elements currently matching; never waits.
    async fn count(&self, locator: &Locator) -> HarnessResult<usize>;

    async fn title(&self) -> HarnessResult<String>;

    /// Save a PNG of the viewport to `path`.
    async fn screenshot(&self, path: &Path) -> HarnessResult<()>;

    /// Wait until the document has finished loading.
    async fn wait_for_network_idle(&self, timeout: Duration) -> HarnessResult<()>;
}
