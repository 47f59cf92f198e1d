use log::trace;
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewWebhook, UpdateWebhook, Webhook},
    helpers::new_webhook_id,
};

pub async fn insert_webhook(
    hook: NewWebhook,
    secret: &str,
    conn: &mut SqliteConnection,
) -> Result<Webhook, sqlx::Error> {
    let hook = sqlx::query_as(
        "INSERT INTO webhooks (id, merchant_id, url, events, secret) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(new_webhook_id())
    .bind(hook.merchant_id)
    .bind(hook.url)
    .bind(Json(hook.events))
    .bind(secret)
    .fetch_one(conn)
    .await?;
    Ok(hook)
}

pub async fn fetch_webhook(
    merchant_id: &str,
    webhook_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Webhook>, sqlx::Error> {
    let hook = sqlx::query_as("SELECT * FROM webhooks WHERE id = $1 AND merchant_id = $2")
        .bind(webhook_id)
        .bind(merchant_id)
        .fetch_optional(conn)
        .await?;
    Ok(hook)
}

pub async fn fetch_webhooks(merchant_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Webhook>, sqlx::Error> {
    let hooks = sqlx::query_as("SELECT * FROM webhooks WHERE merchant_id = $1 ORDER BY created_at DESC")
        .bind(merchant_id)
        .fetch_all(conn)
        .await?;
    Ok(hooks)
}

pub(crate) async fn update_webhook(
    merchant_id: &str,
    webhook_id: &str,
    update: UpdateWebhook,
    conn: &mut SqliteConnection,
) -> Result<Option<Webhook>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE webhooks SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(url) = update.url {
        set_clause.push("url = ");
        set_clause.push_bind_unseparated(url);
    }
    if let Some(events) = update.events {
        set_clause.push("events = ");
        set_clause.push_bind_unseparated(Json(events));
    }
    if let Some(is_active) = update.is_active {
        set_clause.push("is_active = ");
        set_clause.push_bind_unseparated(is_active);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(webhook_id);
    builder.push(" AND merchant_id = ");
    builder.push_bind(merchant_id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res =
        builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Webhook::from_row(&row)).transpose()?;
    Ok(res)
}

/// Returns true if a row was deleted.
pub async fn delete_webhook(
    merchant_id: &str,
    webhook_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM webhooks WHERE id = $1 AND merchant_id = $2")
        .bind(webhook_id)
        .bind(merchant_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn rotate_webhook_secret(
    merchant_id: &str,
    webhook_id: &str,
    new_secret: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Webhook>, sqlx::Error> {
    let hook = sqlx::query_as(
        "UPDATE webhooks SET secret = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND merchant_id = $3 \
         RETURNING *",
    )
    .bind(new_secret)
    .bind(webhook_id)
    .bind(merchant_id)
    .fetch_optional(conn)
    .await?;
    Ok(hook)
}
