//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the route table from the files config
//! - Bind the listener and run the server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, so traffic only arrives once routes exist

use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::handlers;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::PatternError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] PatternError),

    #[error("invalid metrics address {address:?}: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Bring the server up on the configured address and serve until `shutdown`.
pub async fn run(config: ServerConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let shutdown = shutdown.subscribe();
    let listener = Listener::bind(&config.listener).await?;
    run_with_listener(config, listener, shutdown).await
}

/// Like [`run`], but on a listener the caller already bound.
pub async fn run_with_listener(
    config: ServerConfig,
    listener: Listener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address
            .parse()
            .map_err(|source| StartupError::MetricsAddress {
                address: address.clone(),
                source,
            })?;
        metrics::init_metrics(addr)?;
    }

    let router = handlers::routes(config.files.directory.clone())?;
    tracing::info!(
        routes = router.len(),
        directory = ?config.files.directory,
        "Route table built"
    );

    let server = HttpServer::new(router, &config);
    server.run(listener, shutdown).await?;
    Ok(())
}
