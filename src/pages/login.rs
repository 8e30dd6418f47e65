use tracing::info;

use crate::browser::{ElementActions, Locator};
use crate::error::HarnessResult;

#[derive(Clone)]
pub struct LoginPage {
    actions: ElementActions,
    username_input: Locator,
    password_input: Locator,
    submit_button: Locator,
}

impl LoginPage {
    pub fn new(actions: ElementActions) -> Self {
        Self {
            actions,
            username_input: Locator::xpath("//input[@name = 'username']"),
            password_input: Locator::role("textbox", "Password"),
            submit_button: Locator::xpath("//button[@type = 'submit']"),
        }
    }

    pub fn username_input(&self) -> &Locator {
        &self.username_input
    }

    pub fn password_input(&self) -> &Locator {
        &self.password_input
    }

    pub fn submit_button(&self) -> &Locator {
        &self.submit_button
    }

    /// Fill both credential fields and submit the form.
    pub async fn login(&self, username: &str, password: &str) -> HarnessResult<()> {
        info!("Enter user name.");
        self.actions.type_text(&self.username_input, username).await?;

        info!("Enter password.");
        self.actions.type_text(&self.password_input, password).await?;

        self.actions.click(&self.submit_button).await
    }
}
