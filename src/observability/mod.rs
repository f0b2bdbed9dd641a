//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway, node client, API handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), server binary only
//! ```

pub mod logging;
pub mod metrics;
