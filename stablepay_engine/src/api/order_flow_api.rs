use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;
use serde_json::json;

use crate::{
    api::order_objects::{CreateOrderParams, OrderListResult, OrderQueryFilter},
    db_types::{Memo, NewOrder, Order, OrderId},
    events::{EventProducers, OrderExpiredEvent, OrderPaidEvent},
    helpers::{new_memo, new_order_id, ZERO_ADDRESS},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// Expiry applied to merchant-initiated orders when the caller does not supply one.
pub const DEFAULT_ORDER_TTL_SECONDS: i64 = 3600;
/// Link-originated orders always expire after 30 minutes.
pub const LINK_ORDER_TTL_SECONDS: i64 = 1800;

/// `OrderFlowApi` is the primary API for the order lifecycle: creating orders (from the merchant API or from a public
/// payment link), confirming payment against a memo, querying, and expiring overdue orders.
pub struct OrderFlowApi<B> {
    db: B,
    payment_url_base: String,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new<S: Into<String>>(db: B, payment_url_base: S, producers: EventProducers) -> Self {
        Self { db, payment_url_base: payment_url_base.into(), producers }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Creates a new pending order for the merchant.
    ///
    /// A fresh memo is generated for the order. The memo column's UNIQUE constraint is the collision guard; on the
    /// (astronomically rare) collision the database error propagates and the caller retries.
    pub async fn create_order(&self, params: CreateOrderParams) -> Result<Order, PaymentGatewayError> {
        let memo = new_memo();
        let ttl = params.ttl_seconds.unwrap_or(DEFAULT_ORDER_TTL_SECONDS);
        let order = NewOrder {
            id: new_order_id(),
            merchant_id: params.merchant_id,
            payment_link_id: None,
            amount: params.amount,
            currency: params.currency,
            payment_url: format!("{}/pay/{memo}", self.payment_url_base),
            memo,
            expires_at: Utc::now() + Duration::seconds(ttl),
            metadata: params.metadata,
            created_at: Utc::now(),
        };
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {} created for merchant {} with memo {}", order.id, order.merchant_id, order.memo);
        Ok(order)
    }

    /// Creates a pending order for a public payment link.
    ///
    /// Fails with [`PaymentGatewayError::PaymentLinkNotFound`] when the link is unknown or inactive, and with
    /// [`PaymentGatewayError::MerchantNotConfigured`] when the owning merchant has no usable settlement address.
    /// The resulting order carries the link's amount and currency, a 30-minute expiry, and metadata recording which
    /// link it came from.
    pub async fn create_order_from_link(&self, link_id: &str) -> Result<Order, PaymentGatewayError> {
        let (link, merchant) = self
            .db
            .fetch_active_link_checkout(link_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentLinkNotFound(link_id.to_string()))?;
        let usable = merchant.settlement_address.as_deref().map(|a| a != ZERO_ADDRESS).unwrap_or(false);
        if !usable {
            info!("🔄️📦️ Merchant {} has no settlement address. Link {link_id} checkout refused.", merchant.id);
            return Err(PaymentGatewayError::MerchantNotConfigured(merchant.id));
        }
        let memo = new_memo();
        let order = NewOrder {
            id: new_order_id(),
            merchant_id: merchant.id,
            payment_link_id: Some(link.id.clone()),
            amount: link.amount,
            currency: link.currency,
            payment_url: format!("/pay/{memo}"),
            memo,
            expires_at: Utc::now() + Duration::seconds(LINK_ORDER_TTL_SECONDS),
            metadata: Some(json!({ "paymentLinkId": link.id, "paymentLinkTitle": link.title })),
            created_at: Utc::now(),
        };
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {} created from payment link {} with memo {}", order.id, link.id, order.memo);
        Ok(order)
    }

    /// Confirms payment for the order carrying the given memo, stamping the transaction hash, the paying address and
    /// the payment time, and firing the order-paid hooks.
    ///
    /// The confirmation is applied regardless of the order's current status or expiry. That mirrors the behaviour of
    /// the settlement flow this gateway fronts: the chain transfer has already happened by the time this is called,
    /// so refusing to record it would lose information.
    pub async fn confirm_order(
        &self,
        memo: &Memo,
        tx_hash: &str,
        customer_address: &str,
    ) -> Result<Order, PaymentGatewayError> {
        let order = self
            .db
            .confirm_order_by_memo(memo, tx_hash, customer_address)
            .await?
            .ok_or_else(|| PaymentGatewayError::MemoNotFound(memo.clone()))?;
        debug!("🔄️✅️ Order {} confirmed as paid with tx {tx_hash}", order.id);
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️✅️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    /// Fetches an order for the merchant. Orders belonging to other merchants are invisible.
    pub async fn order(&self, id: &OrderId, merchant_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order(id, merchant_id).await
    }

    pub async fn order_by_memo(&self, memo: &Memo) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order_by_memo(memo).await
    }

    /// The merchant's most recent orders, and whether more rows probably exist. The has-more flag is the usual
    /// approximation: true exactly when the page came back full.
    pub async fn orders_for_merchant(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<(Vec<Order>, bool), PaymentGatewayError> {
        let orders = self.db.fetch_orders_for_merchant(merchant_id, limit).await?;
        let has_more = orders.len() as i64 == limit;
        Ok((orders, has_more))
    }

    /// Filtered, paged order search with an exact total count.
    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<OrderListResult, PaymentGatewayError> {
        let total = self.db.count_orders(&query).await?;
        let offset = query.offset.unwrap_or(0);
        let orders = self.db.search_orders(query).await?;
        let has_more = offset + (orders.len() as i64) < total;
        Ok(OrderListResult { orders, total, has_more })
    }

    /// Marks every overdue pending order as expired and fires the order-expired hooks. Returns the expired orders.
    pub async fn expire_old_orders(&self) -> Result<Vec<Order>, PaymentGatewayError> {
        let expired = self.db.expire_overdue_orders().await?;
        if !expired.is_empty() {
            info!("🔄️⏲️ {} orders have passed their expiry time and were marked as expired", expired.len());
        }
        for emitter in &self.producers.order_expired_producer {
            for order in &expired {
                let event = OrderExpiredEvent::new(order.clone());
                emitter.publish_event(event).await;
            }
        }
        Ok(expired)
    }
}
