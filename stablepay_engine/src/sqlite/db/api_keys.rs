use sqlx::SqliteConnection;

use crate::{
    db_types::{ApiKey, ApiKeySummary, NewApiKey},
    helpers::new_key_id,
    traits::MerchantApiError,
};

const SUMMARY_COLUMNS: &str = "id, name, key_prefix, environment, last_used_at, created_at";

pub async fn insert_api_key(key: NewApiKey, conn: &mut SqliteConnection) -> Result<ApiKey, MerchantApiError> {
    let key = sqlx::query_as(
        r#"
            INSERT INTO api_keys (id, merchant_id, name, key_hash, key_prefix, environment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(new_key_id())
    .bind(key.merchant_id)
    .bind(key.name)
    .bind(key.key_hash)
    .bind(key.key_prefix)
    .bind(key.environment)
    .fetch_one(conn)
    .await?;
    Ok(key)
}

/// The merchant's keys for display, newest first. The hash column is never selected.
pub async fn fetch_api_keys(
    merchant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<ApiKeySummary>, sqlx::Error> {
    let keys = sqlx::query_as(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM api_keys WHERE merchant_id = $1 ORDER BY created_at DESC"
    ))
    .bind(merchant_id)
    .fetch_all(conn)
    .await?;
    Ok(keys)
}

/// All key records sharing the given visible prefix. The prefix index keeps this to a handful of rows; the caller
/// compares hashes in constant time.
pub async fn fetch_api_key_candidates(
    key_prefix: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<ApiKey>, sqlx::Error> {
    let keys =
        sqlx::query_as("SELECT * FROM api_keys WHERE key_prefix = $1").bind(key_prefix).fetch_all(conn).await?;
    Ok(keys)
}

pub async fn touch_api_key(key_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE api_keys SET last_used_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(key_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn rename_api_key(
    merchant_id: &str,
    key_id: &str,
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<ApiKeySummary, MerchantApiError> {
    let key: Option<ApiKeySummary> = sqlx::query_as(&format!(
        "UPDATE api_keys SET name = $1 WHERE id = $2 AND merchant_id = $3 RETURNING {SUMMARY_COLUMNS}"
    ))
    .bind(name)
    .bind(key_id)
    .bind(merchant_id)
    .fetch_optional(conn)
    .await?;
    key.ok_or_else(|| MerchantApiError::ApiKeyNotFound(key_id.to_string()))
}

pub async fn delete_api_key(
    merchant_id: &str,
    key_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), MerchantApiError> {
    let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND merchant_id = $2")
        .bind(key_id)
        .bind(merchant_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MerchantApiError::ApiKeyNotFound(key_id.to_string()));
    }
    Ok(())
}
