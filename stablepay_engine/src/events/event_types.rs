use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Emitted when an order transitions to `paid`. Webhook dispatchers subscribe to this event; the engine itself does
/// not deliver webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted for every order that the expiry sweep marks as `expired`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderExpiredEvent {
    pub order: Order,
}

impl OrderExpiredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
