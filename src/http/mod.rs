//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, probe routes, wildcard relay route)
//!     → request.rs (request ID layer)
//!     → cors policy filter (preflight short-circuit)
//!     → forward engine (everything else)
//!     → send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, StartupError};
