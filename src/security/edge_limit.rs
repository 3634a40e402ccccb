//! Fixed-window per-IP limiter for the edge ask endpoint.
//!
//! Two buckets per IP: one hour and one second. Counts reset when their
//! bucket has elapsed since it was opened, so unlike
//! [`SlidingWindowLimiter`](crate::security::sliding_window::SlidingWindowLimiter)
//! a client can burst up to twice the limit across a bucket edge.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::EdgeLimitConfig;
use crate::observability::metrics;
use crate::security::ceil_secs;

const HOUR: Duration = Duration::from_secs(60 * 60);
const SECOND: Duration = Duration::from_secs(1);

/// Which bucket denied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWindow {
    Hour,
    Second,
}

impl EdgeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeWindow::Hour => "hour",
            EdgeWindow::Second => "second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDecision {
    Allowed,
    Denied {
        window: EdgeWindow,
        retry_after_secs: u64,
    },
}

impl EdgeDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EdgeDecision::Allowed)
    }
}

/// Bucket state for one IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeWindowState {
    /// When the hourly bucket was opened.
    pub last_reset: Instant,
    pub count_per_hour: u32,
    pub count_per_second: u32,
    /// When the per-second bucket was opened.
    pub last_second: Instant,
}

impl EdgeWindowState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_reset: now,
            count_per_hour: 0,
            count_per_second: 0,
            last_second: now,
        }
    }

    /// Reset whichever buckets have elapsed at `now`.
    ///
    /// An elapsed hour reopens both buckets; otherwise an elapsed second
    /// reopens only the per-second bucket.
    pub fn roll(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_reset) >= HOUR {
            *self = Self::new(now);
        } else if now.saturating_duration_since(self.last_second) >= SECOND {
            self.count_per_second = 0;
            self.last_second = now;
        }
    }
}

/// Per-IP fixed-window limiter.
pub struct EdgeRateLimiter {
    per_hour: u32,
    per_second: u32,
    states: DashMap<String, EdgeWindowState>,
}

impl EdgeRateLimiter {
    pub fn new(config: &EdgeLimitConfig) -> Self {
        Self {
            per_hour: config.requests_per_hour,
            per_second: config.requests_per_second,
            states: DashMap::new(),
        }
    }

    pub fn check(&self, ip: &str) -> EdgeDecision {
        self.check_at(ip, Instant::now())
    }

    /// Roll, check and count under the IP's entry lock.
    pub fn check_at(&self, ip: &str, now: Instant) -> EdgeDecision {
        let decision = {
            let mut entry = self
                .states
                .entry(ip.to_string())
                .or_insert_with(|| EdgeWindowState::new(now));
            let state = entry.value_mut();
            state.roll(now);

            if state.count_per_hour >= self.per_hour {
                let open_for = now.saturating_duration_since(state.last_reset);
                EdgeDecision::Denied {
                    window: EdgeWindow::Hour,
                    retry_after_secs: ceil_secs(HOUR.saturating_sub(open_for)),
                }
            } else if state.count_per_second >= self.per_second {
                let open_for = now.saturating_duration_since(state.last_second);
                EdgeDecision::Denied {
                    window: EdgeWindow::Second,
                    retry_after_secs: ceil_secs(SECOND.saturating_sub(open_for)),
                }
            } else {
                state.count_per_hour += 1;
                state.count_per_second += 1;
                EdgeDecision::Allowed
            }
        };

        match decision {
            EdgeDecision::Allowed => metrics::record_edge_admission("allowed", "none"),
            EdgeDecision::Denied {
                window,
                retry_after_secs,
            } => {
                tracing::warn!(
                    client = %ip,
                    window = window.as_str(),
                    retry_after_secs,
                    "Edge rate limit exceeded"
                );
                metrics::record_edge_admission("denied", window.as_str());
            }
        }

        decision
    }

    pub fn state(&self, ip: &str) -> Option<EdgeWindowState> {
        self.states.get(ip).map(|s| *s.value())
    }
}
