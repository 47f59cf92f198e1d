use thiserror::Error;

use crate::db_types::{NewPaymentLink, PaymentLink, UpdatePaymentLink};

/// Payment link CRUD, always scoped to the owning merchant.
#[allow(async_fn_in_trait)]
pub trait LinkManagement {
    async fn insert_payment_link(&self, link: NewPaymentLink) -> Result<PaymentLink, LinkApiError>;

    async fn fetch_payment_link(&self, merchant_id: &str, link_id: &str)
        -> Result<Option<PaymentLink>, LinkApiError>;

    /// The merchant's links, newest first, at most `limit` rows. Callers wanting a has-more flag fetch `limit + 1`
    /// rows and pop the sentinel.
    async fn fetch_payment_links(&self, merchant_id: &str, limit: i64) -> Result<Vec<PaymentLink>, LinkApiError>;

    async fn update_payment_link(
        &self,
        merchant_id: &str,
        link_id: &str,
        update: UpdatePaymentLink,
    ) -> Result<Option<PaymentLink>, LinkApiError>;

    /// Returns true if a row was deleted. Orders that referenced the link keep their `payment_link_id`.
    async fn delete_payment_link(&self, merchant_id: &str, link_id: &str) -> Result<bool, LinkApiError>;

    async fn set_payment_link_active(
        &self,
        merchant_id: &str,
        link_id: &str,
        active: bool,
    ) -> Result<Option<PaymentLink>, LinkApiError>;

    /// Increments the link's view counter. Views are recorded for inactive links too.
    async fn record_link_view(&self, link_id: &str) -> Result<(), LinkApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum LinkApiError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Payment link {0} does not exist")]
    LinkNotFound(String),
    #[error("The requested payment link change would result in a no-op.")]
    UpdateNoOp,
}

impl From<sqlx::Error> for LinkApiError {
    fn from(e: sqlx::Error) -> Self {
        LinkApiError::DatabaseError(e.to_string())
    }
}
