use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use spg_common::Amount;

use crate::db_types::{Order, OrderStatus};

/// The inputs for a merchant-initiated order. The memo, id, payment URL and expiry time are generated by the engine.
#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub merchant_id: String,
    pub amount: Amount,
    pub currency: String,
    pub metadata: Option<JsonValue>,
    /// Seconds until the order expires. Falls back to the engine default (one hour) when unset.
    pub ttl_seconds: Option<i64>,
}

impl CreateOrderParams {
    pub fn new<S: Into<String>>(merchant_id: S, amount: Amount, currency: S) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            amount,
            currency: currency.into(),
            metadata: None,
            ttl_seconds: None,
        }
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_ttl_seconds(mut self, ttl: i64) -> Self {
        self.ttl_seconds = Some(ttl);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub merchant_id: Option<String>,
    pub status: Option<Vec<OrderStatus>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderQueryFilter {
    pub fn for_merchant<S: Into<String>>(merchant_id: S) -> Self {
        Self { merchant_id: Some(merchant_id.into()), ..Default::default() }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// True when no WHERE clause is needed. Limit and offset do not count as filters.
    pub fn is_unfiltered(&self) -> bool {
        self.merchant_id.is_none() && self.status.is_none() && self.since.is_none() && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unfiltered() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(merchant_id) = &self.merchant_id {
            write!(f, "merchant_id: {merchant_id}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        Ok(())
    }
}

/// A page of orders along with the total number of rows matching the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResult {
    pub orders: Vec<Order>,
    pub total: i64,
    pub has_more: bool,
}
