//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stdout + optional file)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, file)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Named fields on every event (client, tier, host) rather than formatted text
//! - Metrics are cheap and safe to record before an exporter exists

pub mod logging;
pub mod metrics;
