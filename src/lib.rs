//! Resume agent: an A2A endpoint that answers questions about one person's
//! resume, with request admission control and caller identity resolution.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AgentConfig;
pub use http::HttpServer;
pub use identity::AgentCardCache;
pub use lifecycle::Shutdown;
pub use security::{AdmissionController, EdgeRateLimiter, SlidingWindowLimiter};
