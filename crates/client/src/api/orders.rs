//! Order creation and history.

use serde::Serialize;

use marigold_core::{OrderId, ProductId};

use crate::error::ApiError;
use crate::models::{Order, OrderSummary, Page};

use super::{ApiClient, RequestSpec};

/// Line item for a new order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub product: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Payload for creating an order: shipping fields, line items, and the
/// payment method.
///
/// The payment method is an opaque pass-through string; payment processing
/// itself happens elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub items: Vec<NewOrderItem>,
    pub payment_method: String,
}

impl ApiClient {
    /// Create an order; returns the created order detail.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the
    /// payload.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let spec = RequestSpec::post("orders/", serde_json::to_value(order)?);
        self.send(&spec).await
    }

    /// List the authenticated user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn list_orders(&self) -> Result<Page<OrderSummary>, ApiError> {
        self.send(&RequestSpec::get("orders/")).await
    }

    /// Fetch one of the user's orders by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id or another user's
    /// order.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.send(&RequestSpec::get(format!("orders/{id}/"))).await
    }
}
