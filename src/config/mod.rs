//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, UPSTREAM_ORIGIN, ALLOWED_ORIGIN, ...)
//!     → loader.rs (read & parse)
//!     → validation.rs (semantic checks, all errors reported)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc into the server and both components
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never re-read per request
//! - All fields have defaults so a bare environment still boots
//! - Validation separates syntactic (parse) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::{CorsConfig, LimitConfig, ListenerConfig, ProxyConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
