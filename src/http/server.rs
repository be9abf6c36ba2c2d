//! Accept loop and connection tasks.
//!
//! # Responsibilities
//! - Accept connections from a bounded [`Listener`]
//! - Spawn one task per connection that runs the [`Dispatcher`]
//! - Close every connection after its single response
//! - Stop accepting on shutdown and drain in-flight connections
//!
//! # Design Decisions
//! - Accept errors are logged and the loop keeps going
//! - Drain is bounded by `drain_timeout`; stragglers are abandoned

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tracing::Instrument;

use super::dispatcher::Dispatcher;
use crate::config::ServerConfig;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::routing::Router;

pub struct HttpServer {
    dispatcher: Dispatcher,
    tracker: ConnectionTracker,
    drain_timeout: Duration,
}

impl HttpServer {
    pub fn new(router: Router, config: &ServerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(router), config.limits.into()),
            tracker: ConnectionTracker::new(),
            drain_timeout: Duration::from_secs(config.lifecycle.drain_timeout_secs),
        }
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Serve until `shutdown` fires, then wait for open connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.router().len(),
            "HTTP server starting"
        );

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = listener.accept() => accepted,
            };

            let (mut stream, peer, permit) = match accepted {
                Ok(accepted) => accepted,
                Err(ListenerError::Accept(e)) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let guard = self.tracker.track();
            let dispatcher = self.dispatcher.clone();
            let span = tracing::info_span!("connection", connection_id = %guard.id(), peer = %peer);

            tokio::spawn(
                async move {
                    let _permit = permit;
                    let _guard = guard;

                    match dispatcher.serve(&mut stream).await {
                        Ok(status) => tracing::debug!(status = status.code(), "Connection served"),
                        Err(e) => tracing::debug!(error = %e, "Connection ended without a response"),
                    }
                    if let Err(e) = stream.shutdown().await {
                        tracing::trace!(error = %e, "Socket shutdown failed");
                    }
                }
                .instrument(span),
            );
        }

        tracing::info!(
            active = self.tracker.active_count(),
            timeout_secs = self.drain_timeout.as_secs(),
            "Draining connections"
        );
        if tokio::time::timeout(self.drain_timeout, self.tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Drain timeout elapsed, abandoning connections"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
