//! The traits that a storage backend must implement to drive the StablePay engine.
//!
//! The server's route handlers are generic over these traits, which is also what makes them easy to mock in endpoint
//! tests.
mod analytics;
mod data_objects;
mod link_management;
mod merchant_management;
mod payment_gateway_database;
mod settlement;
mod webhook_management;

pub use analytics::{AnalyticsApiError, AnalyticsQueries};
pub use data_objects::{AnalyticsOverview, OrderStats, PaymentLinkStats, RevenueBucket, TransactionSummary};
pub use link_management::{LinkApiError, LinkManagement};
pub use merchant_management::{MerchantApiError, MerchantManagement};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use settlement::{NullSettlementRegistry, SettlementError, SettlementRegistry};
pub use webhook_management::{WebhookApiError, WebhookManagement};
