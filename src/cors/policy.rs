//! Cross-origin policy evaluation and header production.

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN,
    VARY,
};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::schema::CorsConfig;

/// Outcome of evaluating an inbound request against the origin policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// OPTIONS preflight: answer locally with the CORS header set and an
    /// empty body. The upstream is never contacted.
    Preflight,
    /// Hand the request to the forwarding engine. The eventual response
    /// must still carry the CORS header set.
    Forward,
}

/// Error type for policy construction.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("cors.{field} does not form a valid header value")]
    InvalidValue { field: &'static str },

    #[error("cors.allowed_headers contains invalid header name `{0}`")]
    InvalidHeaderName(String),
}

/// Immutable cross-origin policy, built once from configuration.
///
/// All header values are pre-parsed so the per-request path only clones
/// cheap `HeaderValue` handles.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: Option<HeaderValue>,
    max_age: HeaderValue,
    request_allow_list: Vec<HeaderName>,
}

impl CorsPolicy {
    /// Build a policy from validated configuration.
    pub fn from_config(config: &CorsConfig) -> Result<Self, PolicyError> {
        let allow_origin = header_value(&config.allowed_origin, "allowed_origin")?;
        let allow_methods = header_value(&config.allowed_methods.join(", "), "allowed_methods")?;
        let allow_headers = header_value(&config.allowed_headers.join(", "), "allowed_headers")?;
        let expose_headers = if config.exposed_headers.is_empty() {
            None
        } else {
            Some(header_value(
                &config.exposed_headers.join(", "),
                "exposed_headers",
            )?)
        };
        let max_age = header_value(&config.max_age_secs.to_string(), "max_age_secs")?;

        let request_allow_list = config
            .allowed_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
                    .map_err(|_| PolicyError::InvalidHeaderName(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            allow_origin,
            allow_methods,
            allow_headers,
            expose_headers,
            max_age,
            request_allow_list,
        })
    }

    /// Decide how to handle an inbound request.
    ///
    /// Any method/header combination is acceptable here; only the method
    /// matters. Probe routes never reach this point.
    pub fn evaluate<B>(&self, request: &Request<B>) -> Decision {
        if request.method() == Method::OPTIONS {
            Decision::Preflight
        } else {
            Decision::Forward
        }
    }

    /// Build the direct response for a browser preflight.
    pub fn preflight_response(&self) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        self.apply(response.headers_mut());
        response
    }

    /// Stamp the CORS header set onto a response, overwriting any values
    /// the upstream may have supplied for the same keys.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if let Some(expose) = &self.expose_headers {
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
        }
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
        headers.insert(VARY, HeaderValue::from_name(ORIGIN));
    }

    /// Request headers that may be copied through to the upstream.
    pub fn request_allow_list(&self) -> &[HeaderName] {
        &self.request_allow_list
    }
}

fn header_value(value: &str, field: &'static str) -> Result<HeaderValue, PolicyError> {
    HeaderValue::from_str(value).map_err(|_| PolicyError::InvalidValue { field })
}
