//! Shutdown signal handling

use sea_orm::DatabaseConnection;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Time allowed for shutdown work before giving up
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Resolves on Ctrl+C (or SIGTERM on unix)
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Waits for a shutdown signal, then closes the database pool
pub async fn listen_for_shutdown(db: &DatabaseConnection) {
    wait_for_signal().await;
    info!("Shutdown signal received, closing database connections...");

    match timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        db.clone().close(),
    )
    .await
    {
        Ok(Ok(())) => info!("Database connections closed"),
        Ok(Err(e)) => error!("Failed to close database connections: {}", e),
        Err(_) => error!(
            "Closing database connections timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
