//! Billing Rollup Module
//!
//! Computes period spend for the marketplace: every billing account's
//! orders and the resource leases attached to them are folded into
//! exact decimal totals at the order, project, and billing-account
//! levels, then persisted as idempotent rollup rows for the reporting
//! period. All arithmetic runs under one fixed decimal context, so the
//! totals are reproducible bit for bit.

pub mod biller;
pub mod models;
pub mod period;
pub mod postgres;
pub mod precision;
pub mod rollup;
pub mod storage;
pub mod window;


pub use biller::Biller;
pub use models::{BillingAccount, Lease, Order};
pub use period::BillingPeriod;
pub use postgres::PostgresSpendStore;
pub use precision::{decimal_from_f64, decimal_from_str, DecimalContext, SPEND_CONTEXT};
pub use storage::SpendStore;
pub use window::ActiveWindow;
