//! StablePay Engine
//!
//! The StablePay engine contains the core logic for a stablecoin payment gateway. Merchants create orders, customers
//! pay them on-chain, and a checkout application confirms payment against an order identified by its unique memo.
//!
//! The library is divided into two main sections:
//! 1. Database management and control. SQLite is the default backend, with Postgres available behind a feature flag.
//!    You should never need to access the database directly. Instead, use the public API provided by the engine.
//!    The exception is the data types used in the database. These are defined in the `db_types` module and are public.
//! 2. The public API layer ([`OrderFlowApi`], [`MerchantApi`], [`ApiKeyApi`], [`PaymentLinkApi`], [`WebhookApi`],
//!    [`AnalyticsApi`]). Specific backends need to implement the traits in the [`traits`] module in order to act as a
//!    backend for the StablePay server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain actions
//! occur within the engine. For example, when an order is confirmed as paid, an `OrderPaidEvent` is emitted. A simple
//! actor framework is used so that you can hook into these events and perform custom actions, such as dispatching
//! webhooks.
mod api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    order_objects,
    AnalyticsApi,
    ApiKeyApi,
    MerchantApi,
    OrderFlowApi,
    PaymentLinkApi,
    WebhookApi,
};
