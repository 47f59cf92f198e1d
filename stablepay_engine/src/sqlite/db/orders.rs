use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Memo, NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
    traits::PaymentGatewayError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// A memo collision trips the UNIQUE constraint and is reported as [`PaymentGatewayError::DuplicateMemo`].
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let memo = order.memo.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id,
                merchant_id,
                payment_link_id,
                amount,
                currency,
                memo,
                payment_url,
                expires_at,
                metadata,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(order.merchant_id)
    .bind(order.payment_link_id)
    .bind(order.amount)
    .bind(order.currency)
    .bind(order.memo)
    .bind(order.payment_url)
    .bind(order.expires_at)
    .bind(order.metadata.map(sqlx::types::Json))
    .bind(order.created_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("📝️ Order inserted with memo {memo}");
            Ok(order)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(PaymentGatewayError::DuplicateMemo(memo)),
        Err(e) => Err(e.into()),
    }
}

/// Fetches the order with the given id, scoped to the merchant. An order belonging to another merchant is reported
/// as missing.
pub async fn fetch_order(
    id: &OrderId,
    merchant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND merchant_id = $2")
        .bind(id.as_str())
        .bind(merchant_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_by_memo(memo: &Memo, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE memo = $1").bind(memo.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// The merchant's most recent orders, newest first.
pub async fn fetch_orders_for_merchant(
    merchant_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE merchant_id = $1 ORDER BY created_at DESC LIMIT $2")
        .bind(merchant_id)
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

fn push_filters(builder: &mut QueryBuilder<'_, sqlx::Sqlite>, query: &OrderQueryFilter) {
    if query.is_unfiltered() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(merchant_id) = &query.merchant_id {
        where_clause.push("merchant_id = ");
        where_clause.push_bind_unseparated(merchant_id.clone());
    }
    if let Some(statuses) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let statuses = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if let Some(since) = query.since {
        where_clause.push("datetime(created_at) >= datetime(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    if let Some(until) = query.until {
        where_clause.push("datetime(created_at) <= datetime(");
        where_clause.push_bind_unseparated(until);
        where_clause.push_unseparated(")");
    }
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`, newest first.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_filters(&mut builder, &query);
    builder.push(" ORDER BY created_at DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

/// Counts the orders matching the filter. Limit and offset are ignored.
pub async fn count_orders(query: &OrderQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filters(&mut builder, query);
    let count: i64 = builder.build_query_scalar().fetch_one(conn).await?;
    Ok(count)
}

/// Stamps the order matched by `memo` as paid, recording the transaction hash, paying address and payment time.
///
/// There is deliberately no guard on the current status or the expiry time: by the time this is called the on-chain
/// transfer has already happened, and the record must reflect it. Returns `None` when no order carries the memo.
pub(crate) async fn confirm_by_memo(
    memo: &Memo,
    tx_hash: &str,
    customer_address: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'paid', tx_hash = $1, customer_address = $2, paid_at = $3
            WHERE memo = $4
            RETURNING *;
        "#,
    )
    .bind(tx_hash)
    .bind(customer_address)
    .bind(Utc::now())
    .bind(memo.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Marks every pending order whose expiry time has passed as expired. Terminal orders are untouched.
pub(crate) async fn expire_overdue(conn: &mut SqliteConnection) -> Result<Vec<Order>, PaymentGatewayError> {
    let rows = sqlx::query_as(
        "UPDATE orders SET status = 'expired' WHERE status = 'pending' AND datetime(expires_at) < datetime($1) \
         RETURNING *;",
    )
    .bind(Utc::now())
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
