use thiserror::Error;

use crate::db_types::{ApiKey, ApiKeySummary, Merchant, NewApiKey, NewMerchant};

/// Merchant records and the API keys that authenticate them.
#[allow(async_fn_in_trait)]
pub trait MerchantManagement {
    /// Registers a new merchant. Emails are unique; a duplicate surfaces as
    /// [`MerchantApiError::EmailAlreadyExists`].
    async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, MerchantApiError>;

    async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError>;

    async fn update_settlement_address(&self, merchant_id: &str, address: &str)
        -> Result<Merchant, MerchantApiError>;

    async fn set_gas_sponsored(&self, merchant_id: &str, enabled: bool) -> Result<Merchant, MerchantApiError>;

    async fn insert_api_key(&self, key: NewApiKey) -> Result<ApiKey, MerchantApiError>;

    /// The merchant's keys for display. Hashes are never included.
    async fn fetch_api_keys(&self, merchant_id: &str) -> Result<Vec<ApiKeySummary>, MerchantApiError>;

    /// Fetches the full key records whose stored visible prefix matches `key_prefix`. This narrows authentication to
    /// a handful of candidates via an indexed equality match; the caller compares hashes in constant time.
    async fn fetch_api_key_candidates(&self, key_prefix: &str) -> Result<Vec<ApiKey>, MerchantApiError>;

    /// Stamps `last_used_at` on the key. Called after every successful authentication.
    async fn touch_api_key(&self, key_id: &str) -> Result<(), MerchantApiError>;

    async fn rename_api_key(
        &self,
        merchant_id: &str,
        key_id: &str,
        name: &str,
    ) -> Result<ApiKeySummary, MerchantApiError>;

    async fn delete_api_key(&self, merchant_id: &str, key_id: &str) -> Result<(), MerchantApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum MerchantApiError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Merchant {0} does not exist")]
    MerchantNotFound(String),
    #[error("A merchant with email {0} already exists")]
    EmailAlreadyExists(String),
    #[error("API key {0} does not exist")]
    ApiKeyNotFound(String),
    #[error("The presented API key is malformed")]
    MalformedApiKey,
    #[error("The presented API key is not valid")]
    InvalidApiKey,
    #[error("{0} is not a valid settlement address")]
    InvalidSettlementAddress(String),
}

impl From<sqlx::Error> for MerchantApiError {
    fn from(e: sqlx::Error) -> Self {
        MerchantApiError::DatabaseError(e.to_string())
    }
}
