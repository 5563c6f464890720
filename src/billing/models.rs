//! Billing Data Models
//!
//! Marketplace entities read from the store, and the persisted rollup
//! rows written back. All monetary values use `rust_decimal::Decimal`;
//! the hourly prices recorded on orders and leases arrive as floats and
//! are converted to exact decimals before any arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level customer entity.
///
/// The capability flags are independent: an account may spend
/// (demand-enabled) and earn (supply-enabled) at the same time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAccount {
    pub id: String,
    pub create_time: DateTime<Utc>,
    pub demand_enabled: bool,
    pub supply_enabled: bool,
}

/// A priced resource request under a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub billing_account_id: String,
    pub project_id: String,
    /// Hourly price recorded at order time.
    pub price_hr: f64,
}

/// A time-bounded instance of resource usage under an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lease {
    pub id: String,
    pub order_id: String,
    pub create_time: DateTime<Utc>,
    /// `None` while the lease is still active.
    pub end_time: Option<DateTime<Utc>>,
    /// Hourly price this lease is billed at.
    pub price_hr: f64,
}

/// Persisted order-level rollup, at most one row per
/// `(order_id, start_time, end_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSpendRecord {
    pub uid: Uuid,
    pub order_id: String,
    pub spend: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Persisted project-level rollup, keyed like [`OrderSpendRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpendRecord {
    pub uid: Uuid,
    pub project_id: String,
    pub spend: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Persisted billing-account-level rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAccountSpendRecord {
    pub uid: Uuid,
    pub billing_account_id: String,
    pub spend: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
