//! Postgres Spend Store
//!
//! sqlx-backed implementation of [`SpendStore`]. Rollup writes are
//! `ON CONFLICT ... DO UPDATE` upserts on the `(entity id, start_time,
//! end_time)` key, so re-running a period replaces the stored totals.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::billing::models::{
    BillingAccount, BillingAccountSpendRecord, Lease, Order, OrderSpendRecord, ProjectSpendRecord,
};
use crate::billing::period::BillingPeriod;
use crate::billing::storage::SpendStore;
use crate::config::DatabaseConfig;

pub struct PostgresSpendStore {
    pool: PgPool,
}

impl PostgresSpendStore {
    /// Connect a pool with the configured limits.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .context("failed to connect to postgres")?;
        info!("connected to postgres");
        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. one shared with other services.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpendStore for PostgresSpendStore {
    async fn list_all_billing_accounts(&self) -> Result<Vec<BillingAccount>> {
        let rows = sqlx::query(
            r#"SELECT id, create_time, demand_enabled, supply_enabled
               FROM billing_account
               ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing billing accounts")?;

        rows.iter().map(billing_account_from_row).collect()
    }

    async fn list_orders_by_billing_account_id(
        &self,
        billing_account_id: &str,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"SELECT id, billing_account_id, project_id, price_hr
               FROM "order"
               WHERE billing_account_id = $1
               ORDER BY id"#,
        )
        .bind(billing_account_id)
        .fetch_all(&self.pool)
        .await
        .context("listing orders by billing account id")?;

        rows.iter().map(order_from_row).collect()
    }

    async fn list_leases_for_time_range_by_order_id(
        &self,
        order_id: &str,
        period: &BillingPeriod,
    ) -> Result<Vec<Lease>> {
        let rows = sqlx::query(
            r#"SELECT id, order_id, create_time, end_time, price_hr
               FROM lease
               WHERE order_id = $1
                 AND create_time < $3
                 AND (end_time IS NULL OR end_time >= $2)
               ORDER BY id"#,
        )
        .bind(order_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await
        .context("listing leases for time range by order id")?;

        debug!(order = order_id, leases = rows.len(), "listed leases");
        rows.iter().map(lease_from_row).collect()
    }

    async fn create_order_spend(
        &self,
        order_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> Result<OrderSpendRecord> {
        let row = sqlx::query(
            r#"INSERT INTO order_spend (uid, order_id, spend, start_time, end_time)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (order_id, start_time, end_time)
                 DO UPDATE SET spend = EXCLUDED.spend
               RETURNING uid, order_id, spend, start_time, end_time"#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(spend)
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.pool)
        .await
        .context("upserting order spend")?;

        Ok(OrderSpendRecord {
            uid: row.try_get("uid")?,
            order_id: row.try_get("order_id")?,
            spend: row.try_get("spend")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }

    async fn create_project_spend(
        &self,
        project_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> Result<ProjectSpendRecord> {
        let row = sqlx::query(
            r#"INSERT INTO project_spend (uid, project_id, spend, start_time, end_time)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (project_id, start_time, end_time)
                 DO UPDATE SET spend = EXCLUDED.spend
               RETURNING uid, project_id, spend, start_time, end_time"#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(spend)
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.pool)
        .await
        .context("upserting project spend")?;

        Ok(ProjectSpendRecord {
            uid: row.try_get("uid")?,
            project_id: row.try_get("project_id")?,
            spend: row.try_get("spend")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }

    async fn create_billing_account_spend(
        &self,
        billing_account_id: &str,
        spend: Decimal,
        period: &BillingPeriod,
    ) -> Result<BillingAccountSpendRecord> {
        let row = sqlx::query(
            r#"INSERT INTO billing_account_spend (uid, billing_account_id, spend, start_time, end_time)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (billing_account_id, start_time, end_time)
                 DO UPDATE SET spend = EXCLUDED.spend
               RETURNING uid, billing_account_id, spend, start_time, end_time"#,
        )
        .bind(Uuid::new_v4())
        .bind(billing_account_id)
        .bind(spend)
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.pool)
        .await
        .context("upserting billing account spend")?;

        Ok(BillingAccountSpendRecord {
            uid: row.try_get("uid")?,
            billing_account_id: row.try_get("billing_account_id")?,
            spend: row.try_get("spend")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }
}

fn billing_account_from_row(row: &PgRow) -> Result<BillingAccount> {
    Ok(BillingAccount {
        id: row.try_get("id")?,
        create_time: row.try_get("create_time")?,
        demand_enabled: row.try_get("demand_enabled")?,
        supply_enabled: row.try_get("supply_enabled")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        billing_account_id: row.try_get("billing_account_id")?,
        project_id: row.try_get("project_id")?,
        price_hr: row.try_get("price_hr")?,
    })
}

fn lease_from_row(row: &PgRow) -> Result<Lease> {
    Ok(Lease {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        create_time: row.try_get("create_time")?,
        end_time: row.try_get("end_time")?,
        price_hr: row.try_get("price_hr")?,
    })
}
