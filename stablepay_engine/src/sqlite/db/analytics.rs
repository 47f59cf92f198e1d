//! Aggregate queries for the merchant dashboard.
//!
//! Revenue sums are computed with SQLite's REAL arithmetic and formatted to two decimal places. These figures are for
//! display only; the authoritative per-order amounts remain decimal strings and are never overwritten.
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::traits::{AnalyticsOverview, OrderStats, PaymentLinkStats, RevenueBucket, TransactionSummary};

pub async fn overview(merchant_id: &str, conn: &mut SqliteConnection) -> Result<AnalyticsOverview, sqlx::Error> {
    let overview = sqlx::query_as(
        r#"
            SELECT
                printf('%.2f', COALESCE(SUM(CASE WHEN status = 'paid' THEN CAST(amount AS REAL) END), 0))
                    AS total_revenue,
                COUNT(*) AS total_orders,
                COALESCE(SUM(status = 'paid'), 0) AS paid_orders,
                COALESCE(SUM(status = 'pending'), 0) AS pending_orders,
                COALESCE(SUM(status IN ('expired', 'cancelled')), 0) AS failed_orders,
                COUNT(DISTINCT CASE WHEN status = 'paid' THEN customer_address END) AS unique_customers,
                CASE WHEN COUNT(*) = 0 THEN 0.0
                     ELSE ROUND(100.0 * SUM(status = 'paid') / COUNT(*), 2)
                END AS success_rate
            FROM orders
            WHERE merchant_id = $1
        "#,
    )
    .bind(merchant_id)
    .fetch_one(conn)
    .await?;
    Ok(overview)
}

pub async fn revenue_by_day(
    merchant_id: &str,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<RevenueBucket>, sqlx::Error> {
    let buckets = sqlx::query_as(
        r#"
            SELECT
                date(created_at) AS date,
                printf('%.2f', SUM(CAST(amount AS REAL))) AS revenue,
                COUNT(*) AS orders
            FROM orders
            WHERE merchant_id = $1 AND status = 'paid' AND datetime(created_at) >= datetime($2)
            GROUP BY date(created_at)
            ORDER BY date(created_at) ASC
        "#,
    )
    .bind(merchant_id)
    .bind(since)
    .fetch_all(conn)
    .await?;
    Ok(buckets)
}

pub async fn payment_link_stats(
    merchant_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentLinkStats>, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
            SELECT id, title, view_count, payment_count, total_amount, is_active
            FROM payment_links
            WHERE merchant_id = $1
            ORDER BY payment_count DESC, created_at DESC
            LIMIT $2
        "#,
    )
    .bind(merchant_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(stats)
}

pub async fn recent_transactions(
    merchant_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TransactionSummary>, sqlx::Error> {
    let transactions = sqlx::query_as(
        r#"
            SELECT id, amount, currency, status, customer_address, tx_hash, created_at, paid_at
            FROM orders
            WHERE merchant_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#,
    )
    .bind(merchant_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(transactions)
}

pub async fn order_stats(merchant_id: &str, conn: &mut SqliteConnection) -> Result<OrderStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
            SELECT
                COUNT(*) AS total_orders,
                COALESCE(SUM(status = 'paid'), 0) AS paid_orders,
                COALESCE(SUM(status = 'pending'), 0) AS pending_orders,
                printf('%.2f', COALESCE(SUM(CASE WHEN status = 'paid' THEN CAST(amount AS REAL) END), 0))
                    AS total_revenue
            FROM orders
            WHERE merchant_id = $1
        "#,
    )
    .bind(merchant_id)
    .fetch_one(conn)
    .await?;
    Ok(stats)
}
