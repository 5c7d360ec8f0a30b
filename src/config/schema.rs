//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits; defaults mirror the deployment the relay
//! was built for (the BLS public API behind a single training-site origin).

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single fixed upstream the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Cross-origin policy advertised to browsers.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream configuration.
///
/// The origin is scheme + host (+ optional port) only; the inbound request
/// path is appended verbatim when forwarding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream origin, e.g. "https://api.bls.gov". Must not carry a path.
    pub origin: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total upstream round-trip timeout in seconds. Expiry is surfaced
    /// to the client as an upstream failure.
    pub request_timeout_secs: u64,

    /// Exact path answered locally with 200 on HEAD, for clients probing
    /// whether the upstream data endpoint is worth calling.
    pub availability_probe_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://api.bls.gov".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            availability_probe_path: "/publicAPI/v2/timeseries/data/".to_string(),
        }
    }
}

/// Cross-origin policy configuration.
///
/// These values are advertised to the browser on every response and also
/// drive the request-header allow-list when forwarding upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The origin allowed to call the relay (or "*").
    pub allowed_origin: String,

    /// Methods advertised in Access-Control-Allow-Methods.
    pub allowed_methods: Vec<String>,

    /// Request headers advertised in Access-Control-Allow-Headers and
    /// copied through to the upstream.
    pub allowed_headers: Vec<String>,

    /// Response headers advertised in Access-Control-Expose-Headers.
    pub exposed_headers: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://training.pacificescience.com".to_string(),
            allowed_methods: ["GET", "POST", "OPTIONS", "HEAD", "PUT", "DELETE", "PATCH"]
                .map(String::from)
                .to_vec(),
            allowed_headers: [
                "Content-Type",
                "Authorization",
                "Origin",
                "Accept",
                "X-Requested-With",
            ]
            .map(String::from)
            .to_vec(),
            exposed_headers: ["Content-Range", "X-Content-Range"].map(String::from).to_vec(),
            max_age_secs: 86_400,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}
