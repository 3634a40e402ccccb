//! Three-tier admission control.
//!
//! A request is admitted only if the global limiter, the client's per-minute
//! limiter and the client's per-day limiter all grant a slot, checked in that
//! order. Each tier that grants a slot keeps it even when a later tier
//! denies; see `test_earlier_tiers_consume_on_later_denial`.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::sliding_window::SlidingWindowLimiter;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The tier that turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Global,
    PerMinute,
    PerDay,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Global => "global",
            Tier::PerMinute => "per_minute",
            Tier::PerDay => "per_day",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an admission check. Denial is an expected result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Denied { tier: Tier, retry_after: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Remaining quota for one client, as reported in `X-RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub global_limit: u32,
    pub global_remaining: u32,
    pub per_minute_limit: u32,
    pub per_minute_remaining: u32,
    pub per_day_limit: u32,
    pub per_day_remaining: u32,
}

/// Per-client counters. Created on first contact and kept for the life of
/// the process.
#[derive(Debug)]
pub struct ClientQuota {
    per_minute: SlidingWindowLimiter,
    per_day: SlidingWindowLimiter,
}

impl ClientQuota {
    fn new(limits: &RateLimitConfig) -> Self {
        Self {
            per_minute: SlidingWindowLimiter::new(limits.max_requests_per_minute, MINUTE),
            per_day: SlidingWindowLimiter::new(limits.max_requests_per_day, DAY),
        }
    }
}

/// Admission controller shared by every request handler.
pub struct AdmissionController {
    global: SlidingWindowLimiter,
    clients: DashMap<String, Arc<ClientQuota>>,
    /// Limits for clients seen from now on.
    limits: ArcSwap<RateLimitConfig>,
}

impl AdmissionController {
    pub fn new(config: RateLimitConfig) -> Self {
        let global = SlidingWindowLimiter::new(
            config.global_limit,
            Duration::from_secs(config.global_window_secs),
        );
        Self {
            global,
            clients: DashMap::new(),
            limits: ArcSwap::from_pointee(config),
        }
    }

    /// Whether a request from `client_id` may proceed.
    pub fn should_allow(&self, client_id: &str) -> bool {
        self.check(client_id).is_admitted()
    }

    pub fn check(&self, client_id: &str) -> Admission {
        self.check_at(client_id, Instant::now())
    }

    pub fn check_at(&self, client_id: &str, now: Instant) -> Admission {
        let admission = self.evaluate(client_id, now);

        match admission {
            Admission::Admitted => metrics::record_admission("admitted", "none"),
            Admission::Denied { tier, .. } => {
                match tier {
                    Tier::Global => tracing::warn!(
                        client = %client_id,
                        tier = %tier,
                        "Global rate limit exceeded"
                    ),
                    _ => tracing::warn!(
                        client = %client_id,
                        tier = %tier,
                        "Client exceeded rate limit"
                    ),
                }
                metrics::record_admission("denied", tier.as_str());
            }
        }

        admission
    }

    fn evaluate(&self, client_id: &str, now: Instant) -> Admission {
        if !self.global.try_acquire_at(now) {
            return Admission::Denied {
                tier: Tier::Global,
                retry_after: self.global.retry_after_at(now),
            };
        }

        let quota = self.quota_for(client_id);

        if !quota.per_minute.try_acquire_at(now) {
            return Admission::Denied {
                tier: Tier::PerMinute,
                retry_after: quota.per_minute.retry_after_at(now),
            };
        }

        if !quota.per_day.try_acquire_at(now) {
            return Admission::Denied {
                tier: Tier::PerDay,
                retry_after: quota.per_day.retry_after_at(now),
            };
        }

        Admission::Admitted
    }

    /// Atomic get-or-create; racing first requests share one quota.
    fn quota_for(&self, client_id: &str) -> Arc<ClientQuota> {
        if let Some(existing) = self.clients.get(client_id) {
            return existing.value().clone();
        }

        let limits = self.limits.load();
        self.clients
            .entry(client_id.to_string())
            .or_insert_with(|| Arc::new(ClientQuota::new(&limits)))
            .value()
            .clone()
    }

    /// Non-mutating quota snapshot. Unseen clients report a full quota.
    pub fn rate_limit_info(&self, client_id: &str) -> RateLimitInfo {
        self.rate_limit_info_at(client_id, Instant::now())
    }

    pub fn rate_limit_info_at(&self, client_id: &str, now: Instant) -> RateLimitInfo {
        let global_limit = self.global.limit();
        let global_remaining = self.global.remaining_at(now);

        let quota = self.clients.get(client_id).map(|q| q.value().clone());
        match quota {
            Some(quota) => RateLimitInfo {
                global_limit,
                global_remaining,
                per_minute_limit: quota.per_minute.limit(),
                per_minute_remaining: quota.per_minute.remaining_at(now),
                per_day_limit: quota.per_day.limit(),
                per_day_remaining: quota.per_day.remaining_at(now),
            },
            None => {
                let limits = self.limits.load();
                RateLimitInfo {
                    global_limit,
                    global_remaining,
                    per_minute_limit: limits.max_requests_per_minute,
                    per_minute_remaining: limits.max_requests_per_minute,
                    per_day_limit: limits.max_requests_per_day,
                    per_day_remaining: limits.max_requests_per_day,
                }
            }
        }
    }

    /// Replace the per-client limits used for clients first seen after this
    /// call. Existing quotas and the global limiter are untouched.
    pub fn update_limits(&self, config: RateLimitConfig) {
        tracing::info!(
            per_minute = config.max_requests_per_minute,
            per_day = config.max_requests_per_day,
            "Admission limits updated"
        );
        self.limits.store(Arc::new(config));
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}
