use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::traits::data_objects::{AnalyticsOverview, OrderStats, PaymentLinkStats, RevenueBucket, TransactionSummary};

/// Read-only aggregate queries backing the merchant dashboard.
#[allow(async_fn_in_trait)]
pub trait AnalyticsQueries {
    /// Revenue total, order counts by status, unique paying customers and the success rate for one merchant.
    async fn overview(&self, merchant_id: &str) -> Result<AnalyticsOverview, AnalyticsApiError>;

    /// Daily revenue buckets for paid orders created since the given instant, oldest first.
    async fn revenue_by_day(
        &self,
        merchant_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RevenueBucket>, AnalyticsApiError>;

    /// The merchant's payment links ranked by payment count.
    async fn payment_link_stats(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentLinkStats>, AnalyticsApiError>;

    async fn recent_transactions(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<TransactionSummary>, AnalyticsApiError>;

    async fn order_stats(&self, merchant_id: &str) -> Result<OrderStats, AnalyticsApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AnalyticsApiError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AnalyticsApiError {
    fn from(e: sqlx::Error) -> Self {
        AnalyticsApiError::DatabaseError(e.to_string())
    }
}
