use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Merchant, NewMerchant},
    helpers::new_merchant_id,
    traits::MerchantApiError,
};

/// Inserts a new merchant, generating its id. Emails are unique.
pub async fn insert_merchant(
    merchant: NewMerchant,
    conn: &mut SqliteConnection,
) -> Result<Merchant, MerchantApiError> {
    let email = merchant.email.clone();
    let result = sqlx::query_as("INSERT INTO merchants (id, name, email) VALUES ($1, $2, $3) RETURNING *")
        .bind(new_merchant_id())
        .bind(merchant.name)
        .bind(merchant.email)
        .fetch_one(conn)
        .await;
    match result {
        Ok(merchant) => Ok(merchant),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(MerchantApiError::EmailAlreadyExists(email))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_merchant(merchant_id: &str, conn: &mut SqliteConnection) -> Result<Option<Merchant>, sqlx::Error> {
    let merchant =
        sqlx::query_as("SELECT * FROM merchants WHERE id = $1").bind(merchant_id).fetch_optional(conn).await?;
    Ok(merchant)
}

pub async fn update_settlement_address(
    merchant_id: &str,
    address: &str,
    conn: &mut SqliteConnection,
) -> Result<Merchant, MerchantApiError> {
    let merchant: Option<Merchant> = sqlx::query_as(
        "UPDATE merchants SET settlement_address = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(address)
    .bind(merchant_id)
    .fetch_optional(conn)
    .await?;
    debug!("📝️ Settlement address updated for merchant {merchant_id}");
    merchant.ok_or_else(|| MerchantApiError::MerchantNotFound(merchant_id.to_string()))
}

pub async fn set_gas_sponsored(
    merchant_id: &str,
    enabled: bool,
    conn: &mut SqliteConnection,
) -> Result<Merchant, MerchantApiError> {
    let merchant: Option<Merchant> = sqlx::query_as(
        "UPDATE merchants SET gas_sponsored = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(enabled)
    .bind(merchant_id)
    .fetch_optional(conn)
    .await?;
    merchant.ok_or_else(|| MerchantApiError::MerchantNotFound(merchant_id.to_string()))
}
