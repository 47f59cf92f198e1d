use std::fmt::Debug;

use log::*;
use spg_common::Secret;

use crate::{
    db_types::{ApiKeySummary, KeyEnvironment, NewApiKey},
    helpers::{api_key_hash, api_key_prefix, generate_api_key},
    traits::{MerchantApiError, MerchantManagement},
};

/// API key lifecycle management for the merchant dashboard.
pub struct ApiKeyApi<B> {
    db: B,
}

impl<B> Debug for ApiKeyApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKeyApi")
    }
}

impl<B> ApiKeyApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ApiKeyApi<B>
where B: MerchantManagement
{
    /// Creates a new API key and returns its summary along with the raw key. The raw key is never retrievable again;
    /// only its SHA-256 hash is stored.
    pub async fn create_api_key(
        &self,
        merchant_id: &str,
        name: &str,
        environment: KeyEnvironment,
    ) -> Result<(ApiKeySummary, Secret<String>), MerchantApiError> {
        let raw_key = generate_api_key(environment);
        let key = NewApiKey {
            merchant_id: merchant_id.to_string(),
            name: name.to_string(),
            key_hash: api_key_hash(&raw_key),
            key_prefix: api_key_prefix(&raw_key),
            environment,
        };
        let key = self.db.insert_api_key(key).await?;
        info!("🔑️ API key {} ({}) created for merchant {merchant_id}", key.id, key.key_prefix);
        Ok((key.into(), Secret::new(raw_key)))
    }

    pub async fn api_keys(&self, merchant_id: &str) -> Result<Vec<ApiKeySummary>, MerchantApiError> {
        self.db.fetch_api_keys(merchant_id).await
    }

    pub async fn rename_api_key(
        &self,
        merchant_id: &str,
        key_id: &str,
        name: &str,
    ) -> Result<ApiKeySummary, MerchantApiError> {
        self.db.rename_api_key(merchant_id, key_id, name).await
    }

    pub async fn delete_api_key(&self, merchant_id: &str, key_id: &str) -> Result<(), MerchantApiError> {
        self.db.delete_api_key(merchant_id, key_id).await?;
        info!("🔑️ API key {key_id} deleted for merchant {merchant_id}");
        Ok(())
    }
}
