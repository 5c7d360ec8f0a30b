//! CORS Relay Proxy
//!
//! A single-upstream HTTP proxy built with Tokio and Axum. It sits between
//! a browser client and a third-party data API that does not emit
//! permissive cross-origin headers, and rewrites traffic so the browser
//! accepts it.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request ──▶ http::server ──▶ cors (policy filter)
//!                                             │
//!                              OPTIONS?       │ otherwise
//!                        ◀── preflight ◀──────┼──▶ forward (engine) ──▶ upstream
//!                                             │
//!     Client Response ◀── response rewrite ◀──┘
//!
//!     Cross-cutting: config (env → immutable struct), observability
//!     (tracing), lifecycle (graceful shutdown).
//! ```
//!
//! Probe routes (`GET /health`, `HEAD` availability path) answer locally
//! and never reach the policy filter or the upstream.

pub mod config;
pub mod cors;
pub mod forward;
pub mod http;
pub mod lifecycle;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
