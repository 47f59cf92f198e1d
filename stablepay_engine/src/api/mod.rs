pub mod order_objects;

mod analytics_api;
mod api_key_api;
mod merchant_api;
mod order_flow_api;
mod payment_link_api;
mod webhook_api;

pub use analytics_api::AnalyticsApi;
pub use api_key_api::ApiKeyApi;
pub use merchant_api::MerchantApi;
pub use order_flow_api::OrderFlowApi;
pub use payment_link_api::PaymentLinkApi;
pub use webhook_api::WebhookApi;
