use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPaymentLink, PaymentLink, UpdatePaymentLink},
    traits::{LinkApiError, LinkManagement},
};

/// Payment link management for the merchant dashboard.
pub struct PaymentLinkApi<B> {
    db: B,
}

impl<B> Debug for PaymentLinkApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentLinkApi")
    }
}

impl<B> PaymentLinkApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentLinkApi<B>
where B: LinkManagement
{
    pub async fn create_payment_link(&self, link: NewPaymentLink) -> Result<PaymentLink, LinkApiError> {
        let link = self.db.insert_payment_link(link).await?;
        info!("🔗️ Payment link {} created for merchant {}", link.id, link.merchant_id);
        Ok(link)
    }

    pub async fn payment_link(&self, merchant_id: &str, link_id: &str) -> Result<Option<PaymentLink>, LinkApiError> {
        self.db.fetch_payment_link(merchant_id, link_id).await
    }

    /// A page of the merchant's links, newest first. Fetches one row past the limit to decide the has-more flag.
    pub async fn payment_links(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<(Vec<PaymentLink>, bool), LinkApiError> {
        let mut links = self.db.fetch_payment_links(merchant_id, limit + 1).await?;
        let has_more = links.len() as i64 > limit;
        if has_more {
            links.pop();
        }
        Ok((links, has_more))
    }

    pub async fn update_payment_link(
        &self,
        merchant_id: &str,
        link_id: &str,
        update: UpdatePaymentLink,
    ) -> Result<PaymentLink, LinkApiError> {
        if update.is_empty() {
            debug!("🔗️ No fields to update for payment link {link_id}. Update request skipped.");
            return Err(LinkApiError::UpdateNoOp);
        }
        self.db
            .update_payment_link(merchant_id, link_id, update)
            .await?
            .ok_or_else(|| LinkApiError::LinkNotFound(link_id.to_string()))
    }

    pub async fn delete_payment_link(&self, merchant_id: &str, link_id: &str) -> Result<(), LinkApiError> {
        let deleted = self.db.delete_payment_link(merchant_id, link_id).await?;
        if !deleted {
            return Err(LinkApiError::LinkNotFound(link_id.to_string()));
        }
        info!("🔗️ Payment link {link_id} deleted for merchant {merchant_id}");
        Ok(())
    }

    pub async fn set_payment_link_active(
        &self,
        merchant_id: &str,
        link_id: &str,
        active: bool,
    ) -> Result<PaymentLink, LinkApiError> {
        self.db
            .set_payment_link_active(merchant_id, link_id, active)
            .await?
            .ok_or_else(|| LinkApiError::LinkNotFound(link_id.to_string()))
    }

    /// Records a view of the public checkout page for the link.
    pub async fn record_view(&self, link_id: &str) -> Result<(), LinkApiError> {
        self.db.record_link_view(link_id).await
    }
}
