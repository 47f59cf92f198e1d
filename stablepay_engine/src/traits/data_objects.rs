use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spg_common::Amount;
use sqlx::FromRow;

use crate::db_types::{OrderId, OrderStatus};

/// The dashboard landing-page numbers for one merchant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    /// Sum of amounts over paid orders, formatted to two decimal places.
    pub total_revenue: String,
    pub total_orders: i64,
    pub paid_orders: i64,
    pub pending_orders: i64,
    /// Expired and cancelled orders combined.
    pub failed_orders: i64,
    /// Distinct customer addresses across paid orders.
    pub unique_customers: i64,
    /// paid / total, as a percentage rounded to two decimal places. Zero when there are no orders.
    pub success_rate: f64,
}

/// One day's worth of confirmed revenue.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RevenueBucket {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentLinkStats {
    pub id: String,
    pub title: String,
    pub view_count: i64,
    pub payment_count: i64,
    pub total_amount: Amount,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: OrderId,
    pub amount: Amount,
    pub currency: String,
    pub status: OrderStatus,
    pub customer_address: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub paid_orders: i64,
    pub pending_orders: i64,
    pub total_revenue: String,
}
