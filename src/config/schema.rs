//! Configuration schema definitions.
//!
//! All sections derive Serde traits and default individually, so a config
//! file only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::http::ReadLimits;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Directory served by the file handlers.
    pub files: FilesConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4221").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4221".to_string(),
            max_connections: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilesConfig {
    /// Root for `/files/{filename}`. File routes answer 500 while unset.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of request line plus headers in bytes.
    pub max_head_bytes: usize,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = ReadLimits::default();
        Self {
            max_head_bytes: limits.max_head_bytes,
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl From<LimitsConfig> for ReadLimits {
    fn from(config: LimitsConfig) -> Self {
        Self {
            max_head_bytes: config.max_head_bytes,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long shutdown waits for in-flight connections, in seconds.
    pub drain_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 5,
        }
    }
}
