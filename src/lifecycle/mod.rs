//! Process lifecycle.
//!
//! # Design Decisions
//! - Shutdown is coordinated through a broadcast channel so the server
//!   future can be completed from tests as well as from Ctrl+C
//! - Startup is fail-fast: configuration problems abort before the
//!   listener binds

pub mod shutdown;

pub use shutdown::Shutdown;
