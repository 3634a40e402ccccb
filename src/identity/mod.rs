//! Caller identity subsystem.
//!
//! # Data Flow
//! ```text
//! inbound A2A request
//!     → caller.rs (RequestContext: remote IP, local IP, scheme, host)
//!     → self-reference guard (loopback / own IP / localhost → skip)
//!     → cache.rs (fresh entry? return it)
//!     → fetcher.rs (GET {scheme}://{host}/.well-known/agent.json)
//!     → card.rs (normalize) → cached for the TTL
//! ```
//!
//! # Design Decisions
//! - Resolution never fails the request; callers get `None` and a log line
//! - Expiry is passive, checked on read
//! - One in-flight fetch per host; hosts never contend with each other

pub mod cache;
pub mod caller;
pub mod card;
pub mod fetcher;

use thiserror::Error;

pub use cache::AgentCardCache;
pub use caller::RequestContext;
pub use card::{AgentCapabilities, AgentCard};
pub use fetcher::{CardFetcher, HttpCardFetcher};

/// Failure to resolve an agent card.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent card endpoint returned status {0}")]
    Status(u16),

    #[error("malformed agent card: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("agent card fetch timed out")]
    Timeout,

    #[error("agent card fetch cancelled")]
    Cancelled,

    /// A fetch for the same host failed while this lookup was waiting on it.
    #[error("concurrent agent card fetch failed: {0}")]
    Shared(String),
}
