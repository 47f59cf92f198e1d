use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewWebhook, UpdateWebhook, Webhook},
    helpers::{new_webhook_secret, sign_payload},
    traits::{WebhookApiError, WebhookManagement},
};

/// Webhook subscription management. Delivery is not handled here; dispatchers subscribe to the engine's event hooks
/// and use [`WebhookApi::sign_event`] to authenticate their deliveries.
pub struct WebhookApi<B> {
    db: B,
}

impl<B> Debug for WebhookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B> WebhookApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The hex HMAC-SHA256 signature a dispatcher attaches to a delivery of `payload` for this webhook.
    pub fn sign_event(&self, webhook: &Webhook, payload: &[u8]) -> String {
        sign_payload(&webhook.secret, payload)
    }
}

impl<B> WebhookApi<B>
where B: WebhookManagement
{
    /// Creates a subscription with a freshly generated signing secret. The secret is part of the returned record, and
    /// this is the only time the dashboard shows it in full.
    pub async fn create_webhook(&self, hook: NewWebhook) -> Result<Webhook, WebhookApiError> {
        let secret = new_webhook_secret();
        let hook = self.db.insert_webhook(hook, &secret).await?;
        info!("🪝️ Webhook {} created for merchant {}", hook.id, hook.merchant_id);
        Ok(hook)
    }

    pub async fn webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<Option<Webhook>, WebhookApiError> {
        self.db.fetch_webhook(merchant_id, webhook_id).await
    }

    pub async fn webhooks(&self, merchant_id: &str) -> Result<Vec<Webhook>, WebhookApiError> {
        self.db.fetch_webhooks(merchant_id).await
    }

    pub async fn update_webhook(
        &self,
        merchant_id: &str,
        webhook_id: &str,
        update: UpdateWebhook,
    ) -> Result<Webhook, WebhookApiError> {
        if update.is_empty() {
            debug!("🪝️ No fields to update for webhook {webhook_id}. Update request skipped.");
            return Err(WebhookApiError::UpdateNoOp);
        }
        self.db
            .update_webhook(merchant_id, webhook_id, update)
            .await?
            .ok_or_else(|| WebhookApiError::WebhookNotFound(webhook_id.to_string()))
    }

    pub async fn delete_webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<(), WebhookApiError> {
        let deleted = self.db.delete_webhook(merchant_id, webhook_id).await?;
        if !deleted {
            return Err(WebhookApiError::WebhookNotFound(webhook_id.to_string()));
        }
        info!("🪝️ Webhook {webhook_id} deleted for merchant {merchant_id}");
        Ok(())
    }

    /// Replaces the webhook's signing secret with a fresh one and returns the updated record.
    pub async fn rotate_secret(&self, merchant_id: &str, webhook_id: &str) -> Result<Webhook, WebhookApiError> {
        let secret = new_webhook_secret();
        let hook = self
            .db
            .rotate_webhook_secret(merchant_id, webhook_id, &secret)
            .await?
            .ok_or_else(|| WebhookApiError::WebhookNotFound(webhook_id.to_string()))?;
        info!("🪝️ Webhook {webhook_id} signing secret rotated");
        Ok(hook)
    }
}
