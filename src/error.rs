use thiserror::Error;

pub type Result<T> = std::result::Result<T, BillingError>;

/// Listing stage a failed persistence-gateway query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    BillingAccounts,
    Orders,
    Leases,
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryStage::BillingAccounts => write!(f, "billing accounts"),
            QueryStage::Orders => write!(f, "orders"),
            QueryStage::Leases => write!(f, "leases"),
        }
    }
}

/// Rollup level a failed upsert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupLevel {
    Order,
    Project,
    BillingAccount,
}

impl std::fmt::Display for RollupLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollupLevel::Order => write!(f, "order"),
            RollupLevel::Project => write!(f, "project"),
            RollupLevel::BillingAccount => write!(f, "billing account"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BillingError {
    /// A numeric input could not be represented exactly as a decimal.
    #[error("could not convert {value:?} into a decimal: {reason}")]
    Conversion { value: String, reason: String },

    /// A decimal operation exceeded the configured precision/exponent
    /// bounds, or could only complete by rounding.
    #[error("decimal {operation} exceeded the arithmetic context")]
    Arithmetic { operation: &'static str },

    /// A listing call to the store failed.
    #[error("listing {stage} failed: {source}")]
    Query {
        stage: QueryStage,
        source: anyhow::Error,
    },

    /// A rollup upsert failed.
    #[error("create {level} spend failed: {source}")]
    Persistence {
        level: RollupLevel,
        source: anyhow::Error,
    },

    /// The run's cancellation token fired. Distinguished from hard
    /// failures so the scheduler can treat it as a timeout.
    #[error("billing run cancelled")]
    Cancelled,
}
