//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, per-connection spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Connection ID flows through every event via a tracing span
//! - Metrics are cheap (atomic increments) and off unless configured

pub mod logging;
pub mod metrics;
