//! `start`: the continuous run mode (spec's two run modes — every other
//! verb here is the one-shot mode). Acquires the singleton run lock first
//! so two schedulers never race over the same store.

use scout_core::config::Config;
use scout_core::lockfile::RunLock;
use scout_daemon::{Scheduler, ShutdownSignal};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let lock = RunLock::current(env!("CARGO_PKG_VERSION"));
    lock.acquire_or_fail().map_err(|e| anyhow::anyhow!(e))?;

    let result = run_inner(config).await;

    RunLock::remove();
    result
}

async fn run_inner(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let shutdown = ShutdownSignal::new();

    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown_for_signal.cancel();
        }
    });

    tracing::info!("issue-scout starting, check_interval={}s", ctx.config.scheduler.check_interval_secs);
    scheduler.run_daemon(&ctx, &shutdown).await;
    Ok(())
}
