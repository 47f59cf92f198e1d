use log::info;
use thiserror::Error;

use crate::db_types::Order;

/// The seam for registering freshly created orders with an on-chain settlement contract.
///
/// The hosted deployment registers orders so that the settlement contract can route incoming transfers by memo. This
/// library does not talk to a chain; [`NullSettlementRegistry`] is the stand-in implementation, and deployments that
/// need real registration provide their own.
#[allow(async_fn_in_trait)]
pub trait SettlementRegistry: Clone {
    async fn register_order(&self, order: &Order) -> Result<(), SettlementError>;
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Order registration failed: {0}")]
    RegistrationFailed(String),
}

/// Logs the registration request and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSettlementRegistry;

impl SettlementRegistry for NullSettlementRegistry {
    async fn register_order(&self, order: &Order) -> Result<(), SettlementError> {
        info!("🧾️ Order {} created with memo {}. On-chain registration is disabled.", order.id, order.memo);
        Ok(())
    }
}
