use tracing::info;

use crate::browser::{ElementActions, Locator};
use crate::error::HarnessResult;

/// Landing page after a successful login.
#[derive(Clone)]
pub struct DashboardPage {
    actions: ElementActions,
    header: Locator,
}

impl DashboardPage {
    pub fn new(actions: ElementActions) -> Self {
        Self {
            actions,
            header: Locator::role("heading", "Dashboard"),
        }
    }

    pub fn header(&self) -> &Locator {
        &self.header
    }

    pub fn sub_menu_locator(&self, text: &str) -> Locator {
        Locator::role_exact("link", text)
    }

    /// Landing probe: is the dashboard header visible right now.
    pub async fn is_displayed(&self) -> bool {
        self.actions.is_visible(&self.header, None).await
    }

    pub async fn expected_page_header(&self, expected: &str) -> bool {
        self.actions.get_text(&self.header, true).await == expected
    }

    pub async fn click_on_sub_menu(&self, text: &str) -> HarnessResult<()> {
        info!("Opening sub menu: {}", text);
        self.actions.click(&self.sub_menu_locator(text)).await
    }
}
