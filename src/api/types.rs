//! Type definitions for the token endpoint and the payment API.
//!
//! ## Key Types
//!
//! - [`TokenResponse`] - OAuth2 client-credentials grant response
//! - [`BuyOrder`] - Order creation payload (`intent` + purchase units)
//! - [`BuyOrderResponse`] - Order as returned by the API

use serde::{Deserialize, Serialize};

/// OAuth2 token endpoint response. Only `access_token` is relied upon.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Capture,
    Authorize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// ISO 4217 code, e.g. `USD`
    pub currency_code: String,
    /// Decimal string, e.g. `10.00`
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    pub amount: Amount,
}

/// Buy-order creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOrder {
    pub intent: Intent,
    pub purchase_units: Vec<PurchaseUnit>,
}

impl BuyOrder {
    /// Single-unit capture order.
    pub fn capture(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            intent: Intent::Capture,
            purchase_units: vec![PurchaseUnit {
                amount: Amount {
                    currency_code: currency_code.into(),
                    value: value.into(),
                },
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOrderResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<serde_json::Value>,
}
