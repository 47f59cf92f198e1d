use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use spg_common::Amount;
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// A lightweight wrapper around the public order identifier (`ord_<token>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------          Memo          ------------------------------------------------------
/// The unique payment reference attached to every order. Customers include the memo with their on-chain transfer so
/// that the payment can be matched with the order. Immutable once the order has been created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Memo(pub String);

impl From<String> for Memo {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for Memo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Memo {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      OrderStatus       ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order is newly created, and no payment has been confirmed.
    Pending,
    /// Payment has been confirmed for the order.
    Paid,
    /// The order passed its expiry time without payment.
    Expired,
    /// The order was cancelled by the merchant.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Expired => write!(f, "expired"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------         Order          ------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub merchant_id: String,
    /// Set when the order was created through a public payment link.
    pub payment_link_id: Option<String>,
    pub amount: Amount,
    pub currency: String,
    pub memo: Memo,
    pub status: OrderStatus,
    pub payment_url: String,
    /// The address that paid for the order. Stamped together with `tx_hash` and `paid_at` on confirmation.
    pub customer_address: Option<String>,
    pub tx_hash: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub metadata: Option<Json<JsonValue>>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder        ------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub merchant_id: String,
    pub payment_link_id: Option<String>,
    pub amount: Amount,
    pub currency: String,
    /// The freshly generated payment reference. Uniqueness is enforced by the database.
    pub memo: Memo,
    pub payment_url: String,
    pub expires_at: DateTime<Utc>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Merchant        ------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub email: String,
    /// The on-chain address that receives settled funds. Orders cannot be created through a payment link until this
    /// has been set.
    pub settlement_address: Option<String>,
    pub gas_sponsored: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub email: String,
}

//--------------------------------------      PaymentLink       ------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub merchant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub amount: Amount,
    pub currency: String,
    pub is_active: bool,
    pub view_count: i64,
    pub payment_count: i64,
    /// Running total of confirmed payments made through this link.
    pub total_amount: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentLink {
    pub merchant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub amount: Amount,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePaymentLink {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePaymentLink {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.is_active.is_none()
    }
}

//--------------------------------------    KeyEnvironment      ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeyEnvironment {
    Test,
    Live,
}

impl Display for KeyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEnvironment::Test => write!(f, "test"),
            KeyEnvironment::Live => write!(f, "live"),
        }
    }
}

impl FromStr for KeyEnvironment {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Self::Test),
            "live" => Ok(Self::Live),
            s => Err(ConversionError(format!("Invalid key environment: {s}"))),
        }
    }
}

//--------------------------------------        ApiKey          ------------------------------------------------------
/// A full API key record. Only the SHA-256 hash of the raw key is stored; the raw key is shown to the merchant exactly
/// once, at creation time.
#[derive(Debug, Clone, FromRow)]
pub struct ApiKey {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub key_hash: String,
    /// The first characters of the raw key, kept so merchants can recognise their keys in a list.
    pub key_prefix: String,
    pub environment: KeyEnvironment,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The list view of an API key. The hash never leaves the engine.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApiKeySummary {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub environment: KeyEnvironment,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeySummary {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            environment: key.environment,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub merchant_id: String,
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub environment: KeyEnvironment,
}

//--------------------------------------    WebhookEventType    ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "payment.succeeded")]
    PaymentSucceeded,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.refunded")]
    PaymentRefunded,
    #[serde(rename = "payment.cancelled")]
    PaymentCancelled,
}

impl Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::PaymentSucceeded => write!(f, "payment.succeeded"),
            WebhookEventType::PaymentFailed => write!(f, "payment.failed"),
            WebhookEventType::PaymentRefunded => write!(f, "payment.refunded"),
            WebhookEventType::PaymentCancelled => write!(f, "payment.cancelled"),
        }
    }
}

//--------------------------------------        Webhook         ------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub merchant_id: String,
    pub url: String,
    /// The event types this subscription wants to receive.
    pub events: Json<Vec<WebhookEventType>>,
    /// The signing secret (`whsec_<48 hex chars>`) used to authenticate deliveries.
    pub secret: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub merchant_id: String,
    pub url: String,
    pub events: Vec<WebhookEventType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWebhook {
    pub url: Option<String>,
    pub events: Option<Vec<WebhookEventType>>,
    pub is_active: Option<bool>,
}

impl UpdateWebhook {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.events.is_none() && self.is_active.is_none()
    }
}
