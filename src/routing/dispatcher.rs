//! Per-route proxy pipeline.
//!
//! # Responsibilities
//! - Run resolve → select → forward for a matched route
//! - Apply the route's method policy and upstream path
//! - Apply the optional retry-with-reselection policy
//!
//! # Design Decisions
//! - Every stage short-circuits with a `GatewayError`; the HTTP layer turns it
//!   into a response
//! - No lock is held across the registry or upstream awaits
//! - A pool lives only for one attempt and is dropped before forwarding

use std::sync::Arc;
use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, Method, Request, Response};

use crate::discovery::ServiceRegistry;
use crate::error::GatewayError;
use crate::http::forwarder::Forwarder;
use crate::load_balancer::{self, LoadBalancer};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::routing::router::Route;

/// Owns the collaborators needed to proxy one request.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<dyn ServiceRegistry>,
    balancer: Arc<dyn LoadBalancer>,
    forwarder: Forwarder,
    retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<dyn ServiceRegistry>,
        balancer: Arc<dyn LoadBalancer>,
        forwarder: Forwarder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            balancer,
            forwarder,
            retry,
        }
    }

    /// Proxy `request` according to `route`.
    pub async fn dispatch(
        &self,
        route: &Route,
        request: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let (parts, body) = request.into_parts();
        let method = route.method.outbound(&parts.method);
        let target = route.upstream_target(parts.uri.query());

        let replayable = body.size_hint().exact() == Some(0);
        if !self.retry.is_enabled() || !replayable {
            return self.attempt(route, &target, method, parts.headers, body).await;
        }

        let mut attempt = 1;
        loop {
            let result = self
                .attempt(route, &target, method.clone(), parts.headers.clone(), Body::empty())
                .await;

            match result {
                Err(e) if self.retry.should_retry(attempt, &method, &e) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::info!(
                        route = %route.name,
                        attempt,
                        delay = ?delay,
                        error = %e,
                        "Retrying with a freshly selected instance"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn attempt(
        &self,
        route: &Route,
        target: &str,
        method: Method,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response<Body>, GatewayError> {
        let instance = {
            let pool = self.registry.resolve(&route.service).await?;
            load_balancer::select(self.balancer.as_ref(), &route.service, &pool)?
        };

        tracing::debug!(
            route = %route.name,
            service = %route.service,
            instance = %instance,
            method = %method,
            target = %target,
            "Forwarding to instance"
        );

        let result = self
            .forwarder
            .forward(&instance, target, method, headers, body)
            .await;

        if let Err(e) = &result {
            metrics::record_upstream_error(&route.service, e.kind());
            if matches!(
                e,
                GatewayError::UpstreamConnectFailed { .. } | GatewayError::UpstreamUnreachable { .. }
            ) {
                self.registry.invalidate(&route.service);
            }
        }
        result
    }
}
