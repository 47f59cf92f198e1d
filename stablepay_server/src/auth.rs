use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use log::*;
use stablepay_engine::{db_types::Merchant, traits::MerchantManagement, MerchantApi};

use crate::errors::{AuthError, ServerError};

/// Resolves the merchant behind the request's `Authorization: Bearer sk_...` header.
///
/// A missing or non-Bearer header fails before touching the database; a present key is validated by
/// [`MerchantApi::authenticate`], which hashes the key and compares it against the stored candidates in constant
/// time. All failures map to a 401 with no detail about which step failed.
pub async fn authenticated_merchant<B: MerchantManagement>(
    req: &HttpRequest,
    api: &MerchantApi<B>,
) -> Result<Merchant, ServerError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingCredential)?;
    let header = header.to_str().map_err(|e| {
        debug!("🔐️ The Authorization header is not valid UTF-8. {e}");
        AuthError::MissingCredential
    })?;
    let raw_key = header.strip_prefix("Bearer ").ok_or(AuthError::MissingCredential)?;
    let merchant = api.authenticate(raw_key.trim()).await?;
    Ok(merchant)
}
