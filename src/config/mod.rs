//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AgentConfig (validated, immutable)
//!     → shared with the server and its subsystems
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server applies new admission limits
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; a missing value is never an error
//! - Validation separates syntactic (serde) from semantic checks
//! - A reload that fails validation is logged and dropped

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    A2aConfig, AgentConfig, AgentProfileConfig, EdgeLimitConfig, IdentityConfig, ListenerConfig,
    ObservabilityConfig, RateLimitConfig, TimeoutConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
