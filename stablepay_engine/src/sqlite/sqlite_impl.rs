//! `SqliteDatabase` is a concrete implementation of a StablePay engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{analytics, api_keys, db_url, merchants, new_pool, orders, payment_links, webhooks};
use crate::{
    db_types::{
        ApiKey,
        ApiKeySummary,
        Memo,
        Merchant,
        NewApiKey,
        NewMerchant,
        NewOrder,
        NewPaymentLink,
        NewWebhook,
        Order,
        OrderId,
        PaymentLink,
        UpdatePaymentLink,
        UpdateWebhook,
        Webhook,
    },
    order_objects::OrderQueryFilter,
    traits::{
        AnalyticsApiError,
        AnalyticsOverview,
        AnalyticsQueries,
        LinkApiError,
        LinkManagement,
        MerchantApiError,
        MerchantManagement,
        OrderStats,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        PaymentLinkStats,
        RevenueBucket,
        TransactionSummary,
        WebhookApiError,
        WebhookManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} has been saved in the DB with memo {}", order.id, order.memo);
        Ok(order)
    }

    async fn fetch_order(&self, id: &OrderId, merchant_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, merchant_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_memo(&self, memo: &Memo) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_memo(memo, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_merchant(merchant_id, limit, &mut conn).await?;
        Ok(orders)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn count_orders(&self, query: &OrderQueryFilter) -> Result<i64, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::count_orders(query, &mut conn).await?;
        Ok(count)
    }

    /// Stamps the order as paid and, when it came from a payment link, bumps that link's payment counters. Both
    /// writes happen in a single transaction so the counters can never drift from the orders table.
    async fn confirm_order_by_memo(
        &self,
        memo: &Memo,
        tx_hash: &str,
        customer_address: &str,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::confirm_by_memo(memo, tx_hash, customer_address, &mut tx).await?;
        if let Some(order) = &order {
            debug!("🗃️ Order {} marked as paid by {customer_address}", order.id);
            if let Some(link_id) = &order.payment_link_id {
                payment_links::record_link_payment(link_id, &order.amount, &mut tx).await?;
                trace!("🗃️ Payment counters updated for link {link_id}");
            }
        }
        tx.commit().await?;
        Ok(order)
    }

    async fn expire_overdue_orders(&self) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let expired = orders::expire_overdue(&mut conn).await?;
        Ok(expired)
    }

    async fn fetch_active_link_checkout(
        &self,
        link_id: &str,
    ) -> Result<Option<(PaymentLink, Merchant)>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let link = match payment_links::fetch_active_payment_link(link_id, &mut conn).await? {
            Some(link) => link,
            None => return Ok(None),
        };
        let merchant = merchants::fetch_merchant(&link.merchant_id, &mut conn).await?.ok_or_else(|| {
            warn!("🗃️ Payment link {link_id} references merchant {} which does not exist", link.merchant_id);
            PaymentGatewayError::PaymentLinkNotFound(link_id.to_string())
        })?;
        Ok(Some((link, merchant)))
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl MerchantManagement for SqliteDatabase {
    async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        merchants::insert_merchant(merchant, &mut conn).await
    }

    async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        let merchant = merchants::fetch_merchant(merchant_id, &mut conn).await?;
        Ok(merchant)
    }

    async fn update_settlement_address(
        &self,
        merchant_id: &str,
        address: &str,
    ) -> Result<Merchant, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        merchants::update_settlement_address(merchant_id, address, &mut conn).await
    }

    async fn set_gas_sponsored(&self, merchant_id: &str, enabled: bool) -> Result<Merchant, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        merchants::set_gas_sponsored(merchant_id, enabled, &mut conn).await
    }

    async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::insert_api_key(key, &mut conn).await
    }

    async fn fetch_api_keys(&self, merchant_id: &str) -> Result<Vec<ApiKeySummary>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        let keys = api_keys::fetch_api_keys(merchant_id, &mut conn).await?;
        Ok(keys)
    }

    async fn fetch_api_key_candidates(&self, key_prefix: &str) -> Result<Vec<ApiKey>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        let keys = api_keys::fetch_api_key_candidates(key_prefix, &mut conn).await?;
        Ok(keys)
    }

    async fn touch_api_key(&self, key_id: &str) -> Result<(), MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::touch_api_key(key_id, &mut conn).await?;
        Ok(())
    }

    async fn rename_api_key(
        &self,
        merchant_id: &str,
        key_id: &str,
        name: &str,
    ) -> Result<ApiKeySummary, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::rename_api_key(merchant_id, key_id, name, &mut conn).await
    }

    async fn delete_api_key(&self, merchant_id: &str, key_id: &str) -> Result<(), MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        api_keys::delete_api_key(merchant_id, key_id, &mut conn).await
    }
}

impl LinkManagement for SqliteDatabase {
    async fn insert_payment_link(&self, link: NewPaymentLink) -> Result<PaymentLink, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let link = payment_links::insert_payment_link(link, &mut conn).await?;
        Ok(link)
    }

    async fn fetch_payment_link(
        &self,
        merchant_id: &str,
        link_id: &str,
    ) -> Result<Option<PaymentLink>, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let link = payment_links::fetch_payment_link(merchant_id, link_id, &mut conn).await?;
        Ok(link)
    }

    async fn fetch_payment_links(&self, merchant_id: &str, limit: i64) -> Result<Vec<PaymentLink>, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let links = payment_links::fetch_payment_links(merchant_id, limit, &mut conn).await?;
        Ok(links)
    }

    async fn update_payment_link(
        &self,
        merchant_id: &str,
        link_id: &str,
        update: UpdatePaymentLink,
    ) -> Result<Option<PaymentLink>, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let link = payment_links::update_payment_link(merchant_id, link_id, update, &mut conn).await?;
        Ok(link)
    }

    async fn delete_payment_link(&self, merchant_id: &str, link_id: &str) -> Result<bool, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = payment_links::delete_payment_link(merchant_id, link_id, &mut conn).await?;
        Ok(deleted)
    }

    async fn set_payment_link_active(
        &self,
        merchant_id: &str,
        link_id: &str,
        active: bool,
    ) -> Result<Option<PaymentLink>, LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        let link = payment_links::set_payment_link_active(merchant_id, link_id, active, &mut conn).await?;
        Ok(link)
    }

    async fn record_link_view(&self, link_id: &str) -> Result<(), LinkApiError> {
        let mut conn = self.pool.acquire().await?;
        payment_links::record_link_view(link_id, &mut conn).await?;
        Ok(())
    }
}

impl WebhookManagement for SqliteDatabase {
    async fn insert_webhook(&self, hook: NewWebhook, secret: &str) -> Result<Webhook, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let hook = webhooks::insert_webhook(hook, secret, &mut conn).await?;
        Ok(hook)
    }

    async fn fetch_webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<Option<Webhook>, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let hook = webhooks::fetch_webhook(merchant_id, webhook_id, &mut conn).await?;
        Ok(hook)
    }

    async fn fetch_webhooks(&self, merchant_id: &str) -> Result<Vec<Webhook>, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let hooks = webhooks::fetch_webhooks(merchant_id, &mut conn).await?;
        Ok(hooks)
    }

    async fn update_webhook(
        &self,
        merchant_id: &str,
        webhook_id: &str,
        update: UpdateWebhook,
    ) -> Result<Option<Webhook>, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let hook = webhooks::update_webhook(merchant_id, webhook_id, update, &mut conn).await?;
        Ok(hook)
    }

    async fn delete_webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<bool, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = webhooks::delete_webhook(merchant_id, webhook_id, &mut conn).await?;
        Ok(deleted)
    }

    async fn rotate_webhook_secret(
        &self,
        merchant_id: &str,
        webhook_id: &str,
        new_secret: &str,
    ) -> Result<Option<Webhook>, WebhookApiError> {
        let mut conn = self.pool.acquire().await?;
        let hook = webhooks::rotate_webhook_secret(merchant_id, webhook_id, new_secret, &mut conn).await?;
        Ok(hook)
    }
}

impl AnalyticsQueries for SqliteDatabase {
    async fn overview(&self, merchant_id: &str) -> Result<AnalyticsOverview, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let overview = analytics::overview(merchant_id, &mut conn).await?;
        Ok(overview)
    }

    async fn revenue_by_day(
        &self,
        merchant_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RevenueBucket>, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let buckets = analytics::revenue_by_day(merchant_id, since, &mut conn).await?;
        Ok(buckets)
    }

    async fn payment_link_stats(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentLinkStats>, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let stats = analytics::payment_link_stats(merchant_id, limit, &mut conn).await?;
        Ok(stats)
    }

    async fn recent_transactions(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<TransactionSummary>, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let transactions = analytics::recent_transactions(merchant_id, limit, &mut conn).await?;
        Ok(transactions)
    }

    async fn order_stats(&self, merchant_id: &str) -> Result<OrderStats, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let stats = analytics::order_stats(merchant_id, &mut conn).await?;
        Ok(stats)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
