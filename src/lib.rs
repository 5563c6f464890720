//! gridbill
//!
//! Period spend rollup engine for a compute marketplace. Billing
//! accounts place priced orders under projects; resource leases accrue
//! against those orders. For one reporting period, gridbill clamps each
//! lease's active interval to the period, converts its hours and hourly
//! price into exact decimals, multiplies them under a fixed arithmetic
//! context, and persists idempotent spend rollups at the order, project,
//! and billing-account levels.

pub mod billing;
pub mod config;
pub mod error;

pub use billing::{Biller, BillingPeriod, PostgresSpendStore, SpendStore};
pub use config::Config;
pub use error::{BillingError, QueryStage, Result, RollupLevel};
