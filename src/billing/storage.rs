//! Persistence Gateway Boundary
//!
//! The read/write interface the rollup engine needs from the relational
//! store. Listing calls feed the aggregation pass; the create calls are
//! idempotent upserts keyed by `(entity id, period start, period end)`,
//! where a repeat write for the same key replaces the stored spend
//! rather than accumulating it.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::billing::models::{
    BillingAccount, BillingAccountSpendRecord, Lease, Order, OrderSpendRecord, ProjectSpendRecord,
};
use crate::billing::period::BillingPeriod;

#[async_trait]
pub trait SpendStore: Send + Sync {
    async fn list_all_billing_accounts(&self) -> anyhow::Result<Vec<BillingAccount>>;

    async fn list_orders_by_billing_account_id(
        &self,
        billing_account_id: &str,
    ) -> anyhow::Result<Vec<Order>>;

    /// Leases under `order_id` whose recorded lifetime overlaps the
    /// period.
    async fn list_leases_for_time_range_by_order_id(
        &self,
        order_id: &str,
        period: &BillingPeriod,
    ) -> anyhow::Result<Vec<Lease>>;

    async fn create_order_spend(
        &self,
        order_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> anyhow::Result<OrderSpendRecord>;

    async fn create_project_spend(
        &self,
        project_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> anyhow::Result<ProjectSpendRecord>;

    async fn create_billing_account_spend(
        &self,
        billing_account_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> anyhow::Result<BillingAccountSpendRecord>;
}
