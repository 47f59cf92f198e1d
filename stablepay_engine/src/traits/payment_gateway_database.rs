use thiserror::Error;

use crate::{
    db_types::{Memo, Merchant, NewOrder, Order, OrderId, PaymentLink},
    order_objects::OrderQueryFilter,
};

/// This trait defines the order-lifecycle behaviour for backends supporting the StablePay engine.
///
/// This behaviour includes:
/// * Creating orders, both merchant-initiated and payment-link-initiated.
/// * Confirming payment against the order matched by a memo.
/// * Querying and listing orders with tenant isolation.
/// * Expiring overdue orders.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order. The memo's UNIQUE constraint is the only collision guard; a duplicate memo surfaces as
    /// [`PaymentGatewayError::DuplicateMemo`] and the caller generates a fresh memo and retries.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    /// Fetches the order with the given id, but only if it belongs to `merchant_id`. An order belonging to another
    /// merchant is indistinguishable from a missing one.
    async fn fetch_order(&self, id: &OrderId, merchant_id: &str) -> Result<Option<Order>, PaymentGatewayError>;

    async fn fetch_order_by_memo(&self, memo: &Memo) -> Result<Option<Order>, PaymentGatewayError>;

    /// The most recent orders for the merchant, newest first, at most `limit` rows.
    async fn fetch_orders_for_merchant(&self, merchant_id: &str, limit: i64)
        -> Result<Vec<Order>, PaymentGatewayError>;

    /// Fetches orders according to the criteria in the [`OrderQueryFilter`], newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Counts the orders matching the filter, ignoring its limit and offset.
    async fn count_orders(&self, query: &OrderQueryFilter) -> Result<i64, PaymentGatewayError>;

    /// Marks the order matched by `memo` as paid, stamping `tx_hash`, `customer_address` and `paid_at` in a single
    /// atomic transaction. When the order originated from a payment link, the link's payment counters are updated in
    /// the same transaction.
    ///
    /// The update is applied regardless of the order's current status or expiry time. Returns `None` when no order
    /// carries the memo, in which case nothing is changed.
    async fn confirm_order_by_memo(
        &self,
        memo: &Memo,
        tx_hash: &str,
        customer_address: &str,
    ) -> Result<Option<Order>, PaymentGatewayError>;

    /// Marks every `pending` order whose expiry time has passed as `expired`. Terminal orders are never touched.
    /// Returns the orders that were expired.
    async fn expire_overdue_orders(&self) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Fetches an *active* payment link together with its owning merchant, for the public checkout flow. Inactive or
    /// unknown links return `None`.
    async fn fetch_active_link_checkout(
        &self,
        link_id: &str,
    ) -> Result<Option<(PaymentLink, Merchant)>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("An order with memo {0} already exists")]
    DuplicateMemo(Memo),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order carries the memo {0}")]
    MemoNotFound(Memo),
    #[error("The payment link {0} does not exist or is inactive")]
    PaymentLinkNotFound(String),
    #[error("Merchant {0} has no usable settlement address")]
    MerchantNotConfigured(String),
    #[error("{0} is not supported")]
    UnsupportedAction(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
