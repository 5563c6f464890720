use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use gridbill::billing::{Biller, PostgresSpendStore};
use gridbill::Config;

/// One-shot rollup runner: load config, connect the store, roll up the
/// current month, exit. An external scheduler decides when (and whether)
/// to invoke it again.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(config.logging.level.as_str());
    if config.logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let store = PostgresSpendStore::connect(&config.database).await?;
    let biller = Biller::new(store);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, cancelling rollup");
            signal_cancel.cancel();
        }
    });

    info!("running demand spend rollup for the current month");
    if let Err(err) = biller.run(&cancel).await {
        error!(error = %err, "rollup run failed");
        return Err(err.into());
    }

    info!("rollup run complete");
    Ok(())
}
