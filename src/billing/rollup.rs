//! Aggregation Tree
//!
//! In-memory accumulators for one rollup run: order totals nest under
//! project totals, which nest under one per-account grand total. A tree
//! is built fresh per billing account and discarded once its rollups are
//! persisted. All additions go through the run's arithmetic context, so
//! totals are exact and traversal order is irrelevant.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::billing::precision::DecimalContext;
use crate::error::Result;

/// Per-account accumulator: grand total plus per-project breakdown.
#[derive(Debug)]
pub struct DemandSpend {
    pub billing_account_id: String,
    pub spend: Decimal,
    pub projects: HashMap<String, ProjectSpend>,
}

/// Per-project accumulator: running total plus per-order breakdown.
#[derive(Debug)]
pub struct ProjectSpend {
    pub project_id: String,
    pub spend: Decimal,
    pub orders: HashMap<String, OrderSpend>,
}

/// Leaf accumulator: one order's running total.
#[derive(Debug)]
pub struct OrderSpend {
    pub order_id: String,
    pub spend: Decimal,
}

impl DemandSpend {
    pub fn new(billing_account_id: impl Into<String>) -> Self {
        Self {
            billing_account_id: billing_account_id.into(),
            spend: Decimal::ZERO,
            projects: HashMap::new(),
        }
    }

    /// Create zeroed project/order entries on first sight, so an order
    /// with no billable leases still rolls up as zero.
    pub fn ensure_order(&mut self, project_id: &str, order_id: &str) {
        let project = self
            .projects
            .entry(project_id.to_string())
            .or_insert_with(|| ProjectSpend {
                project_id: project_id.to_string(),
                spend: Decimal::ZERO,
                orders: HashMap::new(),
            });
        project
            .orders
            .entry(order_id.to_string())
            .or_insert_with(|| OrderSpend {
                order_id: order_id.to_string(),
                spend: Decimal::ZERO,
            });
    }

    /// Fold one lease's spend into the order, project, and account
    /// totals. Each contribution lands exactly once at every level.
    pub fn record(
        &mut self,
        context: &DecimalContext,
        project_id: &str,
        order_id: &str,
        amount: Decimal,
    ) -> Result<()> {
        let project = self
            .projects
            .entry(project_id.to_string())
            .or_insert_with(|| ProjectSpend {
                project_id: project_id.to_string(),
                spend: Decimal::ZERO,
                orders: HashMap::new(),
            });
        let order = project
            .orders
            .entry(order_id.to_string())
            .or_insert_with(|| OrderSpend {
                order_id: order_id.to_string(),
                spend: Decimal::ZERO,
            });
        order.spend = context.add(order.spend, amount)?;
        project.spend = context.add(project.spend, amount)?;
        self.spend = context.add(self.spend, amount)?;
        Ok(())
    }

    pub fn project(&self, project_id: &str) -> Option<&ProjectSpend> {
        self.projects.get(project_id)
    }
}

impl ProjectSpend {
    pub fn order(&self, order_id: &str) -> Option<&OrderSpend> {
        self.orders.get(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::precision::SPEND_CONTEXT;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lease_spend_lands_once_at_every_level() {
        let mut spend = DemandSpend::new("acct-1");
        spend
            .record(&SPEND_CONTEXT, "proj-1", "order-1", dec!(10.50))
            .unwrap();

        assert_eq!(spend.spend, dec!(10.50));
        let project = spend.project("proj-1").unwrap();
        assert_eq!(project.spend, dec!(10.50));
        assert_eq!(project.order("order-1").unwrap().spend, dec!(10.50));
    }

    #[test]
    fn test_two_orders_under_one_project_sum_at_both_levels() {
        let mut spend = DemandSpend::new("acct-1");
        spend
            .record(&SPEND_CONTEXT, "proj-1", "order-1", dec!(2400))
            .unwrap();
        spend
            .record(&SPEND_CONTEXT, "proj-1", "order-2", dec!(150.25))
            .unwrap();

        let project = spend.project("proj-1").unwrap();
        assert_eq!(project.order("order-1").unwrap().spend, dec!(2400));
        assert_eq!(project.order("order-2").unwrap().spend, dec!(150.25));
        assert_eq!(project.spend, dec!(2550.25));
        assert_eq!(spend.spend, dec!(2550.25));
    }

    #[test]
    fn test_projects_accumulate_independently() {
        let mut spend = DemandSpend::new("acct-1");
        spend
            .record(&SPEND_CONTEXT, "proj-1", "order-1", dec!(100))
            .unwrap();
        spend
            .record(&SPEND_CONTEXT, "proj-2", "order-2", dec!(40))
            .unwrap();

        assert_eq!(spend.project("proj-1").unwrap().spend, dec!(100));
        assert_eq!(spend.project("proj-2").unwrap().spend, dec!(40));
        assert_eq!(spend.spend, dec!(140));
    }

    #[test]
    fn test_ensure_order_creates_zeroed_entries() {
        let mut spend = DemandSpend::new("acct-1");
        spend.ensure_order("proj-1", "order-1");

        let project = spend.project("proj-1").unwrap();
        assert_eq!(project.spend, Decimal::ZERO);
        assert_eq!(project.order("order-1").unwrap().spend, Decimal::ZERO);
        assert_eq!(spend.spend, Decimal::ZERO);
    }

    #[test]
    fn test_repeat_leases_accumulate_on_the_same_order() {
        let mut spend = DemandSpend::new("acct-1");
        for _ in 0..3 {
            spend
                .record(&SPEND_CONTEXT, "proj-1", "order-1", dec!(10.3720258))
                .unwrap();
        }
        assert_eq!(
            spend.project("proj-1").unwrap().order("order-1").unwrap().spend,
            dec!(31.1160774)
        );
    }
}
