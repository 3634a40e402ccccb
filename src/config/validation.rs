//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! rules. All problems are reported at once, not just the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AgentConfig;

/// Longest accepted duration setting: one year.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be at most {max} seconds")]
    TooLong { field: &'static str, max: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("identity.well_known_path must start with '/': {0}")]
    BadWellKnownPath(String),

    #[error("a2a.require_auth is set but a2a.api_keys is empty")]
    AuthWithoutKeys,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AgentConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let counts = [
        ("rate_limit.global_limit", u64::from(config.rate_limit.global_limit)),
        ("rate_limit.global_window_secs", config.rate_limit.global_window_secs),
        (
            "rate_limit.max_requests_per_minute",
            u64::from(config.rate_limit.max_requests_per_minute),
        ),
        (
            "rate_limit.max_requests_per_day",
            u64::from(config.rate_limit.max_requests_per_day),
        ),
        ("edge_limit.requests_per_hour", u64::from(config.edge_limit.requests_per_hour)),
        ("edge_limit.requests_per_second", u64::from(config.edge_limit.requests_per_second)),
        ("identity.ttl_secs", config.identity.ttl_secs),
        ("identity.fetch_timeout_secs", config.identity.fetch_timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in counts {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let durations = [
        ("rate_limit.global_window_secs", config.rate_limit.global_window_secs),
        ("identity.ttl_secs", config.identity.ttl_secs),
        ("identity.fetch_timeout_secs", config.identity.fetch_timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in durations {
        if value > MAX_DURATION_SECS {
            errors.push(ValidationError::TooLong {
                field,
                max: MAX_DURATION_SECS,
            });
        }
    }

    let addresses = [
        ("listener.bind_address", &config.listener.bind_address),
        ("observability.metrics_address", &config.observability.metrics_address),
    ];
    for (field, value) in addresses {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::BadAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if !config.identity.well_known_path.starts_with('/') {
        errors.push(ValidationError::BadWellKnownPath(
            config.identity.well_known_path.clone(),
        ));
    }

    if config.a2a.require_auth && config.a2a.api_keys.is_empty() {
        errors.push(ValidationError::AuthWithoutKeys);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AgentConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AgentConfig::default();
        config.rate_limit.max_requests_per_minute = 0;
        config.listener.bind_address = "not-an-address".into();
        config.identity.well_known_path = "agent.json".into();
        config.a2a.require_auth = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero {
            field: "rate_limit.max_requests_per_minute"
        }));
        assert!(errors.contains(&ValidationError::AuthWithoutKeys));
    }

    #[test]
    fn test_rejects_durations_past_a_year() {
        let mut config = AgentConfig::default();
        config.identity.ttl_secs = u64::MAX;
        config.rate_limit.global_window_secs = MAX_DURATION_SECS + 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::TooLong {
                    field: "rate_limit.global_window_secs",
                    max: MAX_DURATION_SECS
                },
                ValidationError::TooLong {
                    field: "identity.ttl_secs",
                    max: MAX_DURATION_SECS
                },
            ]
        );
    }

    #[test]
    fn test_one_year_is_accepted() {
        let mut config = AgentConfig::default();
        config.identity.ttl_secs = MAX_DURATION_SECS;
        assert!(validate_config(&config).is_ok());
    }
}
