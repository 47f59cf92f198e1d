use std::fmt::Debug;

use chrono::{Duration, Utc};

use crate::traits::{
    AnalyticsApiError,
    AnalyticsOverview,
    AnalyticsQueries,
    OrderStats,
    PaymentLinkStats,
    RevenueBucket,
    TransactionSummary,
};

/// Read-only dashboard aggregates.
pub struct AnalyticsApi<B> {
    db: B,
}

impl<B> Debug for AnalyticsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalyticsApi")
    }
}

impl<B> AnalyticsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AnalyticsApi<B>
where B: AnalyticsQueries
{
    pub async fn overview(&self, merchant_id: &str) -> Result<AnalyticsOverview, AnalyticsApiError> {
        self.db.overview(merchant_id).await
    }

    /// Daily revenue buckets covering the last `days` days (the dashboard offers 7, 30 and 90).
    pub async fn revenue_over_days(
        &self,
        merchant_id: &str,
        days: i64,
    ) -> Result<Vec<RevenueBucket>, AnalyticsApiError> {
        let since = Utc::now() - Duration::days(days);
        self.db.revenue_by_day(merchant_id, since).await
    }

    /// The merchant's top payment links by payment count.
    pub async fn top_payment_links(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentLinkStats>, AnalyticsApiError> {
        self.db.payment_link_stats(merchant_id, limit).await
    }

    pub async fn recent_transactions(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<TransactionSummary>, AnalyticsApiError> {
        self.db.recent_transactions(merchant_id, limit).await
    }

    pub async fn order_stats(&self, merchant_id: &str) -> Result<OrderStats, AnalyticsApiError> {
        self.db.order_stats(merchant_id).await
    }
}
