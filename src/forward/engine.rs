//! The proxy round trip: request rewrite, upstream call, response rewrite.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN};
use axum::http::{Request, Uri};
use axum::response::Response;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::cors::CorsPolicy;
use crate::forward::error::{ForwardError, SetupError};

/// Connection-level headers that must not be relayed. RFC 7230 §6.1.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Upstream security headers that are meaningless or harmful once the
/// content is served through a different-origin proxy.
const STRIPPED_SECURITY: &[&str] = &["x-frame-options", "strict-transport-security"];

/// The forwarding engine: one fixed upstream, one shared client.
///
/// Holds no per-request state; each call to [`Forwarder::forward`] is
/// independent and may run concurrently with any other.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: Url,
    upstream_origin: HeaderValue,
    policy: Arc<CorsPolicy>,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Build the engine from validated configuration.
    pub fn new(config: &ProxyConfig, policy: Arc<CorsPolicy>) -> Result<Self, SetupError> {
        let upstream = Url::parse(&config.upstream.origin).map_err(|source| {
            SetupError::UpstreamUrl {
                origin: config.upstream.origin.clone(),
                source,
            }
        })?;

        // The Origin sent upstream is the upstream's own origin, so the
        // request looks same-origin to the API.
        let upstream_origin = HeaderValue::from_str(&upstream.origin().ascii_serialization())
            .map_err(|_| SetupError::UpstreamOriginHeader(config.upstream.origin.clone()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.upstream.connect_timeout_secs))
            .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            upstream,
            upstream_origin,
            policy,
            max_body_bytes: config.limits.max_body_bytes,
        })
    }

    /// Perform one proxy round trip.
    ///
    /// The client library derives the upstream `Host` header from the URL,
    /// which gives changeOrigin semantics for free.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let (parts, body) = request.into_parts();

        let url = upstream_url(&self.upstream, &parts.uri);
        let headers = rewrite_request_headers(
            &parts.headers,
            self.policy.request_allow_list(),
            &self.upstream_origin,
        );

        let body_bytes = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| ForwardError::MalformedRequest(e.to_string()))?;

        tracing::debug!(
            method = %parts.method,
            url = %url,
            body_bytes = body_bytes.len(),
            "Dispatching upstream request"
        );

        let mut builder = self.client.request(parts.method, url).headers(headers);
        if !body_bytes.is_empty() {
            builder = builder.body(body_bytes);
        }

        let upstream = builder.send().await.map_err(classify_send_error)?;
        Ok(self.relay_response(upstream))
    }

    /// Turn the upstream response into the client-facing one: rewritten
    /// headers, identical status, body streamed through unchanged.
    fn relay_response(&self, upstream: reqwest::Response) -> Response {
        let status = upstream.status();
        let headers = rewrite_response_headers(upstream.headers(), &self.policy);

        tracing::debug!(status = %status, "Upstream responded");

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Graft the inbound path and query onto the fixed upstream origin.
///
/// The path is set directly rather than resolved as a URL reference:
/// resolution would let a scheme-relative request-target like
/// `//other.host/x` replace the upstream host. `set_path` can only ever
/// touch the path component, so the target host stays request-independent.
fn upstream_url(base: &Url, uri: &Uri) -> Url {
    let mut url = base.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    url
}

/// Build the upstream header map: a strict allow-list copied from the
/// inbound request, with `Origin` forced to the upstream's own origin.
fn rewrite_request_headers(
    inbound: &HeaderMap,
    allow_list: &[HeaderName],
    upstream_origin: &HeaderValue,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in allow_list {
        if let Some(value) = inbound.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    headers.insert(ORIGIN, upstream_origin.clone());
    headers
}

/// Copy upstream response headers, dropping hop-by-hop and upstream
/// security headers, then stamp the configured CORS set on top.
fn rewrite_response_headers(upstream: &HeaderMap, policy: &CorsPolicy) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if is_stripped(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    policy.apply(&mut headers);
    headers
}

fn is_stripped(name: &HeaderName) -> bool {
    let name = name.as_str();
    HOP_BY_HOP.contains(&name)
        || STRIPPED_SECURITY.contains(&name)
        // The policy overwrites these; stale upstream values must not leak
        // through as duplicates.
        || name.starts_with("access-control-")
}

fn classify_send_error(err: reqwest::Error) -> ForwardError {
    if err.is_timeout() {
        ForwardError::UpstreamTimeout
    } else {
        ForwardError::UpstreamUnreachable(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::CorsConfig;

    fn policy() -> CorsPolicy {
        CorsPolicy::from_config(&CorsConfig::default()).unwrap()
    }

    #[test]
    fn upstream_url_appends_path_and_query() {
        let base = Url::parse("https://api.bls.gov").unwrap();
        let uri: Uri = "/publicAPI/v2/timeseries/data/CUUR0000SA0?startyear=2020"
            .parse()
            .unwrap();
        assert_eq!(
            upstream_url(&base, &uri).as_str(),
            "https://api.bls.gov/publicAPI/v2/timeseries/data/CUUR0000SA0?startyear=2020"
        );
    }

    #[test]
    fn scheme_relative_path_cannot_change_the_upstream_host() {
        let base = Url::parse("https://api.bls.gov").unwrap();
        // `//other.host/x` is a valid origin-form request-target; it must
        // stay a path, never become an authority.
        let uri = Uri::builder()
            .path_and_query("//evil.example/steal")
            .build()
            .unwrap();

        let url = upstream_url(&base, &uri);

        assert_eq!(url.host_str(), Some("api.bls.gov"));
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "//evil.example/steal");
    }

    #[test]
    fn request_headers_follow_the_allow_list() {
        let mut inbound = HeaderMap::new();
        inbound.insert("content-type", HeaderValue::from_static("application/json"));
        inbound.insert("cookie", HeaderValue::from_static("session=secret"));
        inbound.insert("origin", HeaderValue::from_static("http://attacker.test"));

        let upstream_origin = HeaderValue::from_static("https://api.bls.gov");
        let headers =
            rewrite_request_headers(&inbound, policy().request_allow_list(), &upstream_origin);

        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert!(headers.get("cookie").is_none());
        assert_eq!(headers.get("origin").unwrap(), "https://api.bls.gov");
    }

    #[test]
    fn response_rewrite_strips_security_and_hop_by_hop_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-type", HeaderValue::from_static("application/json"));
        upstream.insert("x-frame-options", HeaderValue::from_static("DENY"));
        upstream.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=63072000"),
        );
        upstream.insert("connection", HeaderValue::from_static("close"));

        let headers = rewrite_response_headers(&upstream, &policy());

        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert!(headers.get("x-frame-options").is_none());
        assert!(headers.get("strict-transport-security").is_none());
        assert!(headers.get("connection").is_none());
    }

    #[test]
    fn response_rewrite_overwrites_upstream_cors_values() {
        let mut upstream = HeaderMap::new();
        upstream.insert(
            "access-control-allow-origin",
            HeaderValue::from_static("https://somewhere-else.test"),
        );

        let headers = rewrite_response_headers(&upstream, &policy());

        let values: Vec<_> = headers.get_all("access-control-allow-origin").iter().collect();
        assert_eq!(values, vec!["http://training.pacificescience.com"]);
    }
}
