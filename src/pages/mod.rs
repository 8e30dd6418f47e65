//! Page objects for the HR application under test.
//!
//! Each page holds a clone of [`ElementActions`](crate::browser::ElementActions)
//! and exposes intent-level operations built from its locators.

pub mod dashboard;
pub mod login;
pub mod pim;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use pim::PimPage;
