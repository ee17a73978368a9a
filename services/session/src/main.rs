//! Session Service - Main Entry Point
//!
//! Keeps the session and CSRF stores purged until interrupted.

use anyhow::Context;
use rust_common::{init_tracing, load_dotenv};
use session_service::{Config, SessionManager, spawn_purge_task};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config.tracing)?;

    info!(
        session_timeout_secs = config.sessions.session_timeout.as_secs(),
        csrf_timeout_secs = config.csrf.session_timeout.as_secs(),
        strategy = %config.sessions.strategy,
        "Starting Session Service"
    );

    let manager = Arc::new(SessionManager::new(&config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let purge_task = spawn_purge_task(Arc::clone(&manager), config.purge_interval, shutdown_rx);

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;
    info!("Shutdown signal received");

    // Fails only if the task already exited.
    shutdown_tx.send(true).ok();
    if let Some(handle) = purge_task {
        match tokio::time::timeout(config.shutdown_timeout, handle).await {
            Ok(Ok(())) => info!("Background tasks completed"),
            Ok(Err(e)) => warn!(error = %e, "Purge task failed"),
            Err(_) => warn!("Shutdown timeout reached, abandoning purge task"),
        }
    }

    info!(
        sessions = manager.sessions().len(),
        csrf_tokens = manager.csrf_tokens().len(),
        "Session Service stopped"
    );
    info!(metrics = %manager.metrics_text(), "Final metrics");
    Ok(())
}
