//! Forwarding engine subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (filter chose Forward)
//!     → engine.rs rewrite request (allow-listed headers, Origin forced,
//!       Host derived from the upstream URL)
//!     → upstream round trip (reqwest, no redirect following)
//!     → engine.rs rewrite response (CORS set overwritten, upstream
//!       security headers and hop-by-hop headers dropped)
//!     → streamed back to the client
//!
//! on failure:
//!     → error.rs converts to a well-formed 4xx/5xx JSON response;
//!       the process keeps serving
//! ```
//!
//! # Design Decisions
//! - One fixed upstream; the engine is not a router
//! - No retries: a single upstream failure surfaces immediately
//! - Request/response rewrites are pure functions composed around the call

pub mod engine;
pub mod error;

pub use engine::Forwarder;
pub use error::{ForwardError, SetupError};
