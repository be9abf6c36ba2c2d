//! http-engine
//!
//! A small HTTP/1.1 server built directly on Tokio sockets.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::Listener ──▶ http::HttpServer ──▶ http::Dispatcher
//!                 (bounded accept)   (task per conn)      │
//!                                                         ├─ read_request
//!                                                         ├─ Router::match_route
//!                                                         ├─ handler(RequestContext)
//!     Client ◀──────────────────────── Response::encode ◀─┘
//! ```
//!
//! Routes: `GET /`, `GET /echo/{message}`, `GET /user-agent`,
//! `GET /files/{filename}`, `POST /files/{filename}`.

use std::path::PathBuf;

use clap::Parser;

use http_engine::config::{load_config, validate_config, ConfigError, ServerConfig};
use http_engine::lifecycle::{self, Shutdown};
use http_engine::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "http-engine")]
#[command(about = "Minimal HTTP/1.1 server", long_about = None)]
struct Args {
    /// Directory served by /files/{filename}.
    #[arg(long)]
    directory: Option<PathBuf>,

    /// TOML config file. CLI flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:4221.
    #[arg(long)]
    bind: Option<String>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(directory) = self.directory {
            config.files.directory = Some(directory);
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        directory = ?config.files.directory,
        "http-engine starting"
    );

    let shutdown = Shutdown::new();
    let server = lifecycle::run(config, &shutdown);
    tokio::pin!(server);

    // The signal future only completes after triggering, so keep polling
    // the server until it finishes draining.
    tokio::select! {
        result = &mut server => result?,
        _ = lifecycle::shutdown_on_ctrl_c(&shutdown) => server.await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
