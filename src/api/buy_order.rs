use tracing::info;

use crate::api::client::{ApiResponse, AuthenticatedTransport};
use crate::api::types::BuyOrder;
use crate::error::HarnessResult;

/// Buy-order endpoints of the payment API.
pub struct BuyOrderController<T> {
    transport: T,
    endpoint: String,
}

impl<T: AuthenticatedTransport> BuyOrderController<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub async fn create_order(&self, order: &BuyOrder) -> HarnessResult<ApiResponse> {
        info!("Creating {:?} order with {} purchase unit(s)", order.intent, order.purchase_units.len());
        let payload = serde_json::to_value(order)?;
        self.transport.post_json(&self.endpoint, payload).await
    }

    pub async fn get_order(&self, order_id: &str) -> HarnessResult<ApiResponse> {
        let path = format!("{}/{}", self.endpoint.trim_end_matches('/'), urlencoding::encode(order_id));
        self.transport.get(&path).await
    }
}
