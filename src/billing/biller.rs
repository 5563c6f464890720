//! Rollup Orchestration
//!
//! Walks billing accounts, their orders, and the leases attached to
//! those orders for one reporting period, computing exact spend and
//! persisting rollups bottom-up. One call is one synchronous unit of
//! work: scheduling, retries, and alerting all live outside.

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::billing::models::{BillingAccount, Lease, Order};
use crate::billing::period::BillingPeriod;
use crate::billing::precision::{decimal_from_f64, DecimalContext, SPEND_CONTEXT};
use crate::billing::rollup::DemandSpend;
use crate::billing::storage::SpendStore;
use crate::billing::window::ActiveWindow;
use crate::error::{BillingError, QueryStage, Result, RollupLevel};

pub struct Biller<S> {
    store: S,
    context: DecimalContext,
}

impl<S: SpendStore> Biller<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            context: SPEND_CONTEXT,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Roll up demand spend for the current UTC calendar month.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        self.run_for_period(cancel, BillingPeriod::current_month())
            .await
    }

    /// Roll up demand spend for an explicit reporting period.
    ///
    /// The first error aborts the run. Rollups persisted before the
    /// failure point stay in place; a later successful run for the same
    /// period replaces them key by key.
    pub async fn run_for_period(
        &self,
        cancel: &CancellationToken,
        period: BillingPeriod,
    ) -> Result<()> {
        info!(start = %period.start, end = %period.end, "starting demand spend rollup");
        let result = self.calculate_demand_spend(cancel, &period).await;
        if let Err(err) = &result {
            error!(error = %err, "demand spend rollup failed");
        }
        result
    }

    async fn calculate_demand_spend(
        &self,
        cancel: &CancellationToken,
        period: &BillingPeriod,
    ) -> Result<()> {
        self.ensure_active(cancel)?;
        let billing_accounts = self
            .store
            .list_all_billing_accounts()
            .await
            .map_err(|source| BillingError::Query {
                stage: QueryStage::BillingAccounts,
                source,
            })?;

        for billing_account in &billing_accounts {
            self.rollup_account(cancel, billing_account, period).await?;
        }

        info!(
            accounts = billing_accounts.len(),
            "demand spend rollup complete"
        );
        Ok(())
    }

    async fn rollup_account(
        &self,
        cancel: &CancellationToken,
        billing_account: &BillingAccount,
        period: &BillingPeriod,
    ) -> Result<()> {
        let mut spend = DemandSpend::new(&billing_account.id);

        self.ensure_active(cancel)?;
        let orders = self
            .store
            .list_orders_by_billing_account_id(&billing_account.id)
            .await
            .map_err(|source| BillingError::Query {
                stage: QueryStage::Orders,
                source,
            })?;

        for order in &orders {
            self.rollup_order(cancel, &mut spend, order, period).await?;
        }

        self.ensure_active(cancel)?;
        self.store
            .create_billing_account_spend(&billing_account.id, spend.spend, period)
            .await
            .map_err(|source| BillingError::Persistence {
                level: RollupLevel::BillingAccount,
                source,
            })?;

        debug!(
            account = %billing_account.id,
            total = %spend.spend,
            "billing account rollup persisted"
        );
        Ok(())
    }

    async fn rollup_order(
        &self,
        cancel: &CancellationToken,
        spend: &mut DemandSpend,
        order: &Order,
        period: &BillingPeriod,
    ) -> Result<()> {
        spend.ensure_order(&order.project_id, &order.id);

        self.ensure_active(cancel)?;
        let leases = self
            .store
            .list_leases_for_time_range_by_order_id(&order.id, period)
            .await
            .map_err(|source| BillingError::Query {
                stage: QueryStage::Leases,
                source,
            })?;

        for lease in &leases {
            let amount = self.lease_spend(lease, period)?;
            spend.record(&self.context, &order.project_id, &order.id, amount)?;
        }

        // order rollup first, then the project's cumulative total so far
        let order_total = spend
            .project(&order.project_id)
            .and_then(|project| project.order(&order.id))
            .map(|order_spend| order_spend.spend)
            .unwrap_or(Decimal::ZERO);
        self.ensure_active(cancel)?;
        self.store
            .create_order_spend(&order.id, order_total, period)
            .await
            .map_err(|source| BillingError::Persistence {
                level: RollupLevel::Order,
                source,
            })?;

        let project_total = spend
            .project(&order.project_id)
            .map(|project| project.spend)
            .unwrap_or(Decimal::ZERO);
        self.ensure_active(cancel)?;
        self.store
            .create_project_spend(&order.project_id, project_total, period)
            .await
            .map_err(|source| BillingError::Persistence {
                level: RollupLevel::Project,
                source,
            })?;

        Ok(())
    }

    /// One lease's spend contribution: clamped window hours times the
    /// lease's hourly price, both as exact decimals.
    fn lease_spend(&self, lease: &Lease, period: &BillingPeriod) -> Result<Decimal> {
        let window = ActiveWindow::clamp(lease, period);
        let hours = window.billable_hours();
        if hours == 0.0 {
            debug!(lease = %lease.id, "lease has no billable time inside the period");
            return Ok(Decimal::ZERO);
        }

        let hours = decimal_from_f64(hours)?;
        let price_hr = decimal_from_f64(lease.price_hr)?;
        self.context.mul(hours, price_hr)
    }

    fn ensure_active(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(BillingError::Cancelled);
        }
        Ok(())
    }
}
