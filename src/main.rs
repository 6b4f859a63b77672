use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use yomu_lib::bootstrap::AppServices;
use yomu_lib::shared::utils::logger::init_logger;
use yomu_lib::shared::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let config = AppConfig::from_env();
    log::info!("Starting yomu with {:?}", config);

    let mut services = AppServices::from_config(config).context("failed to wire services")?;

    let cancel = CancellationToken::new();
    let workers = services.start_workers(cancel.clone());

    let mut scheduler = services.scheduler();
    scheduler
        .start()
        .await
        .context("failed to start the scheduler")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    log::info!("Shutdown requested");

    cancel.cancel();
    if let Err(e) = scheduler.shutdown().await {
        log::warn!("Scheduler did not stop cleanly: {}", e);
    }
    services.sessions.close();
    for result in futures::future::join_all(workers).await {
        if let Err(e) = result {
            log::warn!("Worker task ended abnormally: {}", e);
        }
    }

    log::info!("Stopped");
    Ok(())
}
