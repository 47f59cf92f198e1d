use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Merchant, NewMerchant},
    helpers::{api_key_hash, api_key_prefix, constant_time_eq, ZERO_ADDRESS},
    traits::{MerchantApiError, MerchantManagement},
};

/// Merchant registration, settings, and API-key bearer authentication.
pub struct MerchantApi<B> {
    db: B,
}

impl<B> Debug for MerchantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MerchantApi")
    }
}

impl<B> MerchantApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> MerchantApi<B>
where B: MerchantManagement
{
    pub async fn register_merchant(&self, merchant: NewMerchant) -> Result<Merchant, MerchantApiError> {
        let merchant = self.db.insert_merchant(merchant).await?;
        info!("👤️ Merchant {} registered with email {}", merchant.id, merchant.email);
        Ok(merchant)
    }

    pub async fn merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError> {
        self.db.fetch_merchant(merchant_id).await
    }

    /// Sets the address that receives settled funds. The address must be a 0x-prefixed 20-byte hex string and may not
    /// be the zero address.
    pub async fn update_settlement_address(
        &self,
        merchant_id: &str,
        address: &str,
    ) -> Result<Merchant, MerchantApiError> {
        let well_formed = address.len() == 42
            && address.starts_with("0x")
            && address[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !well_formed || address.eq_ignore_ascii_case(ZERO_ADDRESS) {
            return Err(MerchantApiError::InvalidSettlementAddress(address.to_string()));
        }
        let merchant = self.db.update_settlement_address(merchant_id, address).await?;
        info!("👤️ Merchant {merchant_id} updated their settlement address");
        Ok(merchant)
    }

    pub async fn set_gas_sponsored(&self, merchant_id: &str, enabled: bool) -> Result<Merchant, MerchantApiError> {
        self.db.set_gas_sponsored(merchant_id, enabled).await
    }

    /// Authenticates a raw API key presented as a bearer credential.
    ///
    /// Keys that do not start with `sk_test_` or `sk_live_` are rejected without touching the database. Otherwise the
    /// stored visible prefix narrows the candidate rows, and each candidate's stored hash is compared against the
    /// hash of the presented key in constant time, stopping at the first match. A successful match stamps the key's
    /// `last_used_at` and returns the owning merchant.
    pub async fn authenticate(&self, raw_key: &str) -> Result<Merchant, MerchantApiError> {
        if !raw_key.starts_with("sk_test_") && !raw_key.starts_with("sk_live_") {
            return Err(MerchantApiError::MalformedApiKey);
        }
        let prefix = api_key_prefix(raw_key);
        let hash = api_key_hash(raw_key);
        let candidates = self.db.fetch_api_key_candidates(&prefix).await?;
        let matched = candidates.into_iter().find(|k| constant_time_eq(k.key_hash.as_bytes(), hash.as_bytes()));
        let key = match matched {
            Some(key) => key,
            None => {
                debug!("🔐️ No API key matched the presented credential");
                return Err(MerchantApiError::InvalidApiKey);
            },
        };
        self.db.touch_api_key(&key.id).await?;
        let merchant = self.db.fetch_merchant(&key.merchant_id).await?.ok_or_else(|| {
            warn!("🔐️ API key {} belongs to merchant {} which no longer exists", key.id, key.merchant_id);
            MerchantApiError::InvalidApiKey
        })?;
        trace!("🔐️ Merchant {} authenticated with key {}", merchant.id, key.key_prefix);
        Ok(merchant)
    }
}
