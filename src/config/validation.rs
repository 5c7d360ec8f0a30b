//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (parsing handles syntactic)
//! - Check the upstream origin is a usable http(s) origin
//! - Validate value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.origin is not configured")]
    UpstreamMissing,

    #[error("upstream.origin `{origin}` is invalid: {reason}")]
    UpstreamInvalid { origin: String, reason: String },

    #[error("upstream.availability_probe_path `{0}` must start with '/'")]
    ProbePath(String),

    #[error("cors.allowed_origin is not configured")]
    AllowedOriginMissing,

    #[error("cors.allowed_methods is empty")]
    AllowedMethodsEmpty,

    #[error("cors.allowed_methods contains invalid method `{0}`")]
    InvalidMethod(String),

    #[error("upstream timeouts must be greater than zero")]
    ZeroTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.origin.trim().is_empty() {
        errors.push(ValidationError::UpstreamMissing);
    } else {
        match Url::parse(&config.upstream.origin) {
            Ok(url) => {
                if !matches!(url.scheme(), "http" | "https") {
                    errors.push(ValidationError::UpstreamInvalid {
                        origin: config.upstream.origin.clone(),
                        reason: format!("unsupported scheme `{}`", url.scheme()),
                    });
                } else if url.host_str().is_none() {
                    errors.push(ValidationError::UpstreamInvalid {
                        origin: config.upstream.origin.clone(),
                        reason: "missing host".to_string(),
                    });
                } else if url.path() != "/" || url.query().is_some() {
                    // The inbound path is appended verbatim, so the origin
                    // itself must not carry a path or query.
                    errors.push(ValidationError::UpstreamInvalid {
                        origin: config.upstream.origin.clone(),
                        reason: "must be scheme and host only".to_string(),
                    });
                }
            }
            Err(e) => errors.push(ValidationError::UpstreamInvalid {
                origin: config.upstream.origin.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if !config.upstream.availability_probe_path.starts_with('/') {
        errors.push(ValidationError::ProbePath(
            config.upstream.availability_probe_path.clone(),
        ));
    }

    if config.cors.allowed_origin.trim().is_empty() {
        errors.push(ValidationError::AllowedOriginMissing);
    }

    if config.cors.allowed_methods.is_empty() {
        errors.push(ValidationError::AllowedMethodsEmpty);
    }
    for method in &config.cors.allowed_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    if config.upstream.connect_timeout_secs == 0 || config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
