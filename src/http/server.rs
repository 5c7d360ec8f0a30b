//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: probe routes first, wildcard relay route last
//! - Wire up middleware (request ID, trace, outer timeout)
//! - Run the origin policy filter before any upstream interaction
//! - Hand non-preflight requests to the forwarding engine
//! - Guarantee every response, including failures, carries the CORS set

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, head},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::cors::{CorsPolicy, Decision, PolicyError};
use crate::forward::{Forwarder, SetupError};
use crate::http::request::{request_id, MakeRequestUuid};

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid CORS configuration: {0}")]
    Cors(#[from] PolicyError),

    #[error("invalid upstream configuration: {0}")]
    Upstream(#[from] SetupError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<CorsPolicy>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let policy = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let forwarder = Arc::new(Forwarder::new(&config, policy.clone())?);

        let state = AppState { policy, forwarder };
        let router = Self::build_router(&config, state);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        // The engine applies its own upstream timeout; this outer guard
        // only fires if a request wedges outside the upstream call.
        let outer_timeout = Duration::from_secs(config.upstream.request_timeout_secs + 5);

        Router::new()
            .route("/health", get(health_handler).fallback(relay_handler))
            .route(
                &config.upstream.availability_probe_path,
                head(availability_handler).fallback(relay_handler),
            )
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(outer_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until shutdown is signalled (Ctrl+C or the given
    /// receiver).
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Liveness probe. Bypasses the policy filter and the upstream entirely.
async fn health_handler() -> &'static str {
    "OK"
}

/// Availability probe for clients checking whether the upstream data
/// endpoint is worth calling. Answered locally, empty body.
async fn availability_handler() -> StatusCode {
    tracing::debug!("Availability probe answered locally");
    StatusCode::OK
}

/// Main relay handler: policy filter, then preflight or forward.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match state.policy.evaluate(&request) {
        Decision::Preflight => {
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                "Answering preflight locally"
            );
            state.policy.preflight_response()
        }
        Decision::Forward => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Relaying request"
            );
            match state.forwarder.forward(request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        error = %err,
                        "Relay failed"
                    );
                    let mut response = err.into_response();
                    // Failure responses must still be readable cross-origin.
                    state.policy.apply(response.headers_mut());
                    response
                }
            }
        }
    }
}

/// Wait for a shutdown signal (Ctrl+C or broadcast trigger).
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
