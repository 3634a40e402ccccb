//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (client IP, RequestContext)
//!     → security middleware (admission / edge limit / API key)
//!     → a2a.rs (agent card, ask handlers)
//!     → response.rs (429 bodies)
//! ```

pub mod a2a;
pub mod request;
pub mod response;
pub mod server;

pub use request::ConnectionAddrs;
pub use server::{build_router, AppState, HttpServer};
