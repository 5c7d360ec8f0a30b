//! Configuration loading from the process environment.
//!
//! Every variable is optional; unset variables keep their defaults. A
//! variable that is set but empty or unparseable is an error, so a broken
//! deployment fails at startup instead of silently proxying with defaults.

use std::env;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from environment variables.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();

    if let Some(port) = var("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
            var: "PORT",
            reason: format!("`{port}` is not a valid port number"),
        })?;
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }

    if let Some(origin) = var("UPSTREAM_ORIGIN") {
        config.upstream.origin = origin;
    }
    if let Some(secs) = var("UPSTREAM_TIMEOUT_SECS") {
        config.upstream.request_timeout_secs = parse_u64("UPSTREAM_TIMEOUT_SECS", &secs)?;
    }
    if let Some(secs) = var("CONNECT_TIMEOUT_SECS") {
        config.upstream.connect_timeout_secs = parse_u64("CONNECT_TIMEOUT_SECS", &secs)?;
    }
    if let Some(path) = var("AVAILABILITY_PROBE_PATH") {
        config.upstream.availability_probe_path = path;
    }

    if let Some(origin) = var("ALLOWED_ORIGIN") {
        config.cors.allowed_origin = origin;
    }
    if let Some(methods) = var("ALLOWED_METHODS") {
        config.cors.allowed_methods = parse_list(&methods);
    }
    if let Some(headers) = var("ALLOWED_HEADERS") {
        config.cors.allowed_headers = parse_list(&headers);
    }
    if let Some(headers) = var("EXPOSED_HEADERS") {
        config.cors.exposed_headers = parse_list(&headers);
    }
    if let Some(secs) = var("MAX_AGE_SECS") {
        config.cors.max_age_secs = parse_u64("MAX_AGE_SECS", &secs)?;
    }

    if let Some(bytes) = var("MAX_BODY_BYTES") {
        config.limits.max_body_bytes = parse_u64("MAX_BODY_BYTES", &bytes)? as usize;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var: name,
        reason: format!("`{value}` is not a valid number"),
    })
}

/// Split a comma-separated environment value into trimmed entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
