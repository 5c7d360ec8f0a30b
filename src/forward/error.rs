//! Error types for the forwarding engine.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error type for engine construction at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("upstream origin `{origin}` is not a valid URL: {source}")]
    UpstreamUrl {
        origin: String,
        source: url::ParseError,
    },

    #[error("upstream origin `{0}` does not form a valid Origin header")]
    UpstreamOriginHeader(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Per-request failure inside the forwarding engine.
///
/// Every variant converts into a well-formed HTTP response; none may
/// propagate as a fault that terminates the process.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("upstream request timed out")]
    UpstreamTimeout,

    #[error("malformed client request: {0}")]
    MalformedRequest(String),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ForwardError::UpstreamUnreachable(_) | ForwardError::UpstreamTimeout => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ForwardError::UpstreamUnreachable(_) => "upstream_unreachable",
            ForwardError::UpstreamTimeout => "upstream_timeout",
            ForwardError::MalformedRequest(_) => "malformed_request",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_500() {
        assert_eq!(
            ForwardError::UpstreamTimeout.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_request_maps_to_400() {
        assert_eq!(
            ForwardError::MalformedRequest("body too large".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
