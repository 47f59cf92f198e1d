use log::{debug, trace};
use spg_common::Amount;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewPaymentLink, PaymentLink, UpdatePaymentLink},
    helpers::new_link_id,
    traits::PaymentGatewayError,
};

pub async fn insert_payment_link(
    link: NewPaymentLink,
    conn: &mut SqliteConnection,
) -> Result<PaymentLink, sqlx::Error> {
    let link = sqlx::query_as(
        r#"
            INSERT INTO payment_links (id, merchant_id, title, description, image_url, amount, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(new_link_id())
    .bind(link.merchant_id)
    .bind(link.title)
    .bind(link.description)
    .bind(link.image_url)
    .bind(link.amount)
    .bind(link.currency)
    .fetch_one(conn)
    .await?;
    Ok(link)
}

pub async fn fetch_payment_link(
    merchant_id: &str,
    link_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentLink>, sqlx::Error> {
    let link = sqlx::query_as("SELECT * FROM payment_links WHERE id = $1 AND merchant_id = $2")
        .bind(link_id)
        .bind(merchant_id)
        .fetch_optional(conn)
        .await?;
    Ok(link)
}

/// Fetches a payment link by id alone, for the public checkout flow. Only active links are returned.
pub async fn fetch_active_payment_link(
    link_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentLink>, sqlx::Error> {
    let link = sqlx::query_as("SELECT * FROM payment_links WHERE id = $1 AND is_active = 1")
        .bind(link_id)
        .fetch_optional(conn)
        .await?;
    Ok(link)
}

pub async fn fetch_payment_links(
    merchant_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentLink>, sqlx::Error> {
    let links =
        sqlx::query_as("SELECT * FROM payment_links WHERE merchant_id = $1 ORDER BY created_at DESC LIMIT $2")
            .bind(merchant_id)
            .bind(limit)
            .fetch_all(conn)
            .await?;
    Ok(links)
}

pub(crate) async fn update_payment_link(
    merchant_id: &str,
    link_id: &str,
    update: UpdatePaymentLink,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentLink>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE payment_links SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(title) = update.title {
        set_clause.push("title = ");
        set_clause.push_bind_unseparated(title);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    if let Some(amount) = update.amount {
        set_clause.push("amount = ");
        set_clause.push_bind_unseparated(amount);
    }
    if let Some(currency) = update.currency {
        set_clause.push("currency = ");
        set_clause.push_bind_unseparated(currency);
    }
    if let Some(is_active) = update.is_active {
        set_clause.push("is_active = ");
        set_clause.push_bind_unseparated(is_active);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(link_id);
    builder.push(" AND merchant_id = ");
    builder.push_bind(merchant_id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res = builder
        .build()
        .fetch_optional(conn)
        .await?
        .map(|row: SqliteRow| PaymentLink::from_row(&row))
        .transpose()?;
    Ok(res)
}

/// Returns true if a row was deleted.
pub async fn delete_payment_link(
    merchant_id: &str,
    link_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM payment_links WHERE id = $1 AND merchant_id = $2")
        .bind(link_id)
        .bind(merchant_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_payment_link_active(
    merchant_id: &str,
    link_id: &str,
    active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentLink>, sqlx::Error> {
    let link = sqlx::query_as(
        "UPDATE payment_links SET is_active = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND merchant_id = $3 \
         RETURNING *",
    )
    .bind(active)
    .bind(link_id)
    .bind(merchant_id)
    .fetch_optional(conn)
    .await?;
    Ok(link)
}

pub async fn record_link_view(link_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE payment_links SET view_count = view_count + 1 WHERE id = $1")
        .bind(link_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Adds a confirmed payment to the link's counters. The new running total is computed with decimal string
/// arithmetic rather than in SQL, so the stored value never passes through floating point.
pub(crate) async fn record_link_payment(
    link_id: &str,
    amount: &Amount,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let total: Option<(Amount,)> = sqlx::query_as("SELECT total_amount FROM payment_links WHERE id = $1")
        .bind(link_id)
        .fetch_optional(&mut *conn)
        .await?;
    let total = match total {
        Some((total,)) => total,
        // The link was deleted after the order was created. The order keeps its link id, but there is nothing to
        // count against.
        None => {
            debug!("📝️ Payment link {link_id} no longer exists. Payment counters not updated.");
            return Ok(());
        },
    };
    let new_total =
        total.checked_add(amount).map_err(|e| PaymentGatewayError::DatabaseError(e.to_string()))?;
    sqlx::query(
        "UPDATE payment_links SET payment_count = payment_count + 1, total_amount = $1, updated_at = \
         CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(new_total)
    .bind(link_id)
    .execute(conn)
    .await?;
    Ok(())
}
