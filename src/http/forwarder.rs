//! Request forwarding to a single selected instance.
//!
//! # Responsibilities
//! - Issue exactly one outbound request per call
//! - Enforce connect and response-header deadlines
//! - Map transport failures to `UpstreamConnectFailed` (nothing was sent),
//!   `UpstreamUnreachable` (the connection broke after that) or `UpstreamTimeout`
//!
//! # Design Decisions
//! - Bodies stream in both directions; nothing is buffered here
//! - No failover: retrying against another instance is the dispatcher's call
//! - The attempt is a plain future, so dropping it (caller disconnect) cancels
//!   the upstream call and releases its connection

use std::error::Error as _;
use std::time::Duration;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Response};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::{TokioExecutor, TokioTimer},
};

use crate::config::TimeoutConfig;
use crate::discovery::ServiceInstance;
use crate::error::GatewayError;
use crate::http::{request::build_upstream_request, response::relay};

/// HTTP client used for upstream calls.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Forwards one request to one instance.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    upstream_timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder with its own pooled client.
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .build(connector);

        Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }

    /// Send `method path_and_query` with `headers` and `body` to `instance`.
    ///
    /// On success the upstream status, headers and a streaming body are
    /// returned; the deadline only covers the wait for response headers.
    pub async fn forward(
        &self,
        instance: &ServiceInstance,
        path_and_query: &str,
        method: Method,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response<Body>, GatewayError> {
        let request = build_upstream_request(instance, path_and_query, method, headers, body)
            .map_err(|e| GatewayError::UpstreamUnreachable {
                instance: instance.to_string(),
                reason: format!("invalid upstream request: {}", e),
            })?;

        match tokio::time::timeout(self.upstream_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(relay(response)),
            Ok(Err(e)) => {
                let reason = match e.source() {
                    Some(source) => format!("{}: {}", e, source),
                    None => e.to_string(),
                };
                let instance = instance.to_string();
                if e.is_connect() {
                    Err(GatewayError::UpstreamConnectFailed { instance, reason })
                } else {
                    Err(GatewayError::UpstreamUnreachable { instance, reason })
                }
            }
            Err(_) => Err(GatewayError::UpstreamTimeout {
                instance: instance.to_string(),
                timeout_secs: self.upstream_timeout.as_secs(),
            }),
        }
    }
}
