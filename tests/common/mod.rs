//! Shared utilities for integration testing: mock upstreams and a relay
//! harness.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use cors_relay::config::ProxyConfig;
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::Shutdown;

/// A stub upstream that records every request it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    /// Number of connections served.
    pub calls: Arc<AtomicU32>,
    /// Raw request text, one entry per connection.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Start a stub upstream that answers every request with a fixed response.
pub async fn start_mock_upstream(
    status: u16,
    headers: &[(&str, &str)],
    body: &str,
) -> MockUpstream {
    start_upstream(status, headers, body, Duration::ZERO).await
}

/// Start a stub upstream that stalls before answering, to trip the relay's
/// upstream timeout.
pub async fn start_slow_upstream(delay: Duration) -> MockUpstream {
    start_upstream(200, &[], "too late", delay).await
}

async fn start_upstream(
    status: u16,
    headers: &[(&str, &str)],
    body: &str,
    delay: Duration,
) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let status_text = match status {
        200 => "200 OK",
        204 => "204 No Content",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let extra: String = headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}\r\n"))
        .collect();
    let response_str = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        status_text,
        body.len(),
        extra,
        body
    );

    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let counter = calls.clone();
    let captured = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response_str = response_str.clone();
                    let captured = captured.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        captured.lock().await.push(request);

                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream {
        addr,
        calls,
        requests,
    }
}

/// Read one HTTP/1.1 request, headers plus any Content-Length body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..pos]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// An address nothing is listening on (connection refused).
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Configuration pointing at a test upstream, with tight timeouts.
pub fn test_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.origin = format!("http://{upstream}");
    config.upstream.connect_timeout_secs = 1;
    config.upstream.request_timeout_secs = 2;
    config.cors.allowed_origin = "http://example.test".to_string();
    config
}

/// Start a relay on an ephemeral port; returns its address and the
/// shutdown handle keeping it alive.
pub async fn spawn_relay(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("test config should build a server");
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// A reqwest client that ignores system proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
