//! # Payment API side
//!
//! ## Modules
//!
//! - [`token`] - OAuth2 client-credentials exchange
//! - [`session`] - Persisted session state and its file store
//! - [`bootstrap`] - One-time token acquisition with retry
//! - [`client`] - HTTP client injecting the persisted bearer token
//! - [`buy_order`] - Buy-order controller
//! - [`types`] - Request and response types
//!
//! ## Quick Start
//!
//! ```no_run
//! use e2e_harness::api::{bootstrap, ApiClient, BuyOrderController};
//! use e2e_harness::api::types::BuyOrder;
//! use e2e_harness::config::{ApiSettings, ProcessEnv};
//!
//! # async fn example() -> e2e_harness::HarnessResult<()> {
//! bootstrap(&ProcessEnv).await?;
//!
//! let settings = ApiSettings::load(&ProcessEnv)?;
//! let orders = BuyOrderController::new(ApiClient::from_settings(&settings), settings.buy_order_endpoint.clone());
//! let response = orders.create_order(&BuyOrder::capture("USD", "10.00")).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod buy_order;
pub mod client;
pub mod session;
pub mod token;
pub mod types;

pub use bootstrap::{bootstrap, AuthBootstrap};
pub use buy_order::BuyOrderController;
pub use client::{ApiClient, ApiResponse, AuthenticatedTransport};
pub use session::{SessionState, SessionStore};
pub use token::{acquire_token, BearerToken};
