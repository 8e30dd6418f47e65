//! Browser side of the harness.
//!
//! - [`page`] - the [`Page`] capability every backend implements
//! - [`locator`] - selectors and locator chains
//! - [`actions`] - bounded-wait interactions used by page objects
//! - [`webdriver`] - W3C WebDriver backend

pub mod actions;
pub mod locator;
pub mod page;
pub mod webdriver;

pub use actions::{ElementActions, WaitPolicy};
pub use locator::{ElementState, Locator, Selector};
pub use page::Page;
pub use webdriver::WebDriverPage;
