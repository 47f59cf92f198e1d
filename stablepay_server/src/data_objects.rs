use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use spg_common::Amount;
use stablepay_engine::db_types::{Order, OrderId, OrderStatus};

//--------------------------------------    Merchant API (/v1)    ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Amount,
    pub currency: String,
    pub metadata: Option<JsonValue>,
    /// Seconds until the order expires. Falls back to the engine default (one hour) when unset.
    pub expires_in: Option<i64>,
}

/// The response to a successful order creation. Deliberately smaller than the full order view: the memo is exposed
/// through the payment URL only.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreatedResponse {
    pub id: OrderId,
    pub status: OrderStatus,
    pub payment_url: String,
    pub amount: Amount,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Order> for OrderCreatedResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            payment_url: order.payment_url,
            amount: order.amount,
            currency: order.currency,
            created_at: order.created_at,
            expires_at: order.expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListResponse {
    pub data: Vec<Order>,
    pub has_more: bool,
}

//--------------------------------------   Checkout API (/api)    ----------------------------------------------------
// The checkout pages speak camelCase.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub payment_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    pub tx_hash: String,
    pub customer_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOrderResponse {
    pub success: bool,
    pub order: ConfirmedOrderView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub tx_hash: Option<String>,
}

impl From<Order> for ConfirmedOrderView {
    fn from(order: Order) -> Self {
        Self { id: order.id, status: order.status, tx_hash: order.tx_hash }
    }
}
