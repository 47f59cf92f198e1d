use thiserror::Error;

use crate::db_types::{NewWebhook, UpdateWebhook, Webhook};

/// Webhook subscription CRUD, always scoped to the owning merchant. Delivery of webhook events is not handled here;
/// dispatchers subscribe to the engine's event hooks instead.
#[allow(async_fn_in_trait)]
pub trait WebhookManagement {
    async fn insert_webhook(&self, hook: NewWebhook, secret: &str) -> Result<Webhook, WebhookApiError>;

    async fn fetch_webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<Option<Webhook>, WebhookApiError>;

    async fn fetch_webhooks(&self, merchant_id: &str) -> Result<Vec<Webhook>, WebhookApiError>;

    async fn update_webhook(
        &self,
        merchant_id: &str,
        webhook_id: &str,
        update: UpdateWebhook,
    ) -> Result<Option<Webhook>, WebhookApiError>;

    /// Returns true if a row was deleted.
    async fn delete_webhook(&self, merchant_id: &str, webhook_id: &str) -> Result<bool, WebhookApiError>;

    /// Replaces the signing secret. Deliveries signed with the old secret will no longer verify.
    async fn rotate_webhook_secret(
        &self,
        merchant_id: &str,
        webhook_id: &str,
        new_secret: &str,
    ) -> Result<Option<Webhook>, WebhookApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum WebhookApiError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Webhook {0} does not exist")]
    WebhookNotFound(String),
    #[error("The requested webhook change would result in a no-op.")]
    UpdateNoOp,
}

impl From<sqlx::Error> for WebhookApiError {
    fn from(e: sqlx::Error) -> Self {
        WebhookApiError::DatabaseError(e.to_string())
    }
}
