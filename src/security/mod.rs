//! Security subsystem: request admission.
//!
//! # Data Flow
//! ```text
//! /a2a/*:
//!     → rate_limit.rs (admission middleware)
//!         → admission.rs (global → per-minute → per-day)
//!             → sliding_window.rs (one counter per tier)
//!
//! /api/a2a/ask:
//!     → edge_limit.rs (fixed hour/second buckets per IP)
//!     → auth.rs (API key stub)
//! ```
//!
//! # Design Decisions
//! - Sliding and fixed windows stay separate; they burst differently
//! - Denial is a value, never an error
//! - Per-counter locking only; clients never contend with each other

pub mod admission;
pub mod auth;
pub mod edge_limit;
pub mod rate_limit;
pub mod sliding_window;

use std::time::Duration;

pub use admission::{Admission, AdmissionController, RateLimitInfo, Tier};
pub use edge_limit::{EdgeDecision, EdgeRateLimiter, EdgeWindow, EdgeWindowState};
pub use sliding_window::SlidingWindowLimiter;

/// Whole seconds for a `Retry-After` hint: rounded up, never below one.
pub fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}
