//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the agent.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to its defaults when absent.

use serde::{Deserialize, Serialize};

/// Root configuration for the resume agent.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// How this agent describes itself to peers.
    pub agent: AgentProfileConfig,

    /// Sliding-window admission limits for the `/a2a` surface.
    pub rate_limit: RateLimitConfig,

    /// Fixed-window limits for the `/api/a2a` edge endpoint.
    pub edge_limit: EdgeLimitConfig,

    /// A2A endpoint access settings.
    pub a2a: A2aConfig,

    /// Caller identity resolution.
    pub identity: IdentityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Self-description published at the well-known agent card path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentProfileConfig {
    pub name: String,
    pub version: String,
    pub description: String,

    /// Public URL of this agent. Derived from the request when unset.
    pub url: Option<String>,

    /// Base system prompt handed to the answering model.
    pub system_prompt: String,
}

impl Default for AgentProfileConfig {
    fn default() -> Self {
        Self {
            name: "Resume Agent".to_string(),
            version: "1.0.0".to_string(),
            description: "Bot-to-bot communication for accessing professional information."
                .to_string(),
            url: None,
            system_prompt: String::new(),
        }
    }
}

/// Sliding-window admission limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Process-wide admissions per global window.
    pub global_limit: u32,

    /// Length of the global window in seconds.
    pub global_window_secs: u64,

    /// Admissions per client per minute.
    pub max_requests_per_minute: u32,

    /// Admissions per client per day.
    pub max_requests_per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_limit: 10,
            global_window_secs: 1,
            max_requests_per_minute: 60,
            max_requests_per_day: 100,
        }
    }
}

/// Fixed-window limits applied per IP on the edge endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EdgeLimitConfig {
    pub requests_per_hour: u32,
    pub requests_per_second: u32,
}

impl Default for EdgeLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_hour: 50,
            requests_per_second: 2,
        }
    }
}

/// A2A access configuration.
///
/// Authentication is a pass-through stub: keys are compared verbatim.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct A2aConfig {
    /// Require a matching `X-API-Key` header on the edge endpoint.
    pub require_auth: bool,

    /// Accepted API keys.
    pub api_keys: Vec<String>,

    /// Known client identifiers (informational only).
    pub allowed_client_ids: Vec<String>,
}

/// Caller identity resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Resolve caller agent cards at all.
    pub enabled: bool,

    /// How long a resolved card stays usable, in seconds.
    pub ttl_secs: u64,

    /// Path of the agent card under a host.
    pub well_known_path: String,

    /// Timeout for a single card fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            well_known_path: "/.well-known/agent.json".to_string(),
            fetch_timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Append log lines to this file in addition to stdout.
    pub log_file: Option<String>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
