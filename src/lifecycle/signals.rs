//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C (SIGINT) and trigger `shutdown`.
///
/// If the handler cannot be installed the server keeps running and never
/// shuts down on its own.
pub async fn shutdown_on_ctrl_c(shutdown: &Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
