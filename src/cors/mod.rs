//! Origin policy filter subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → policy.rs evaluate (method inspection)
//!     → Decision::Preflight (OPTIONS: answer locally, no upstream call)
//!     | Decision::Forward   (everything else: forwarding engine, with the
//!                            CORS header set applied to the response)
//! ```
//!
//! # Design Decisions
//! - Header values are parsed once at startup, not per request
//! - The filter holds no per-request state
//! - The same header set is applied to preflight and proxied responses

pub mod policy;

pub use policy::{CorsPolicy, Decision, PolicyError};
