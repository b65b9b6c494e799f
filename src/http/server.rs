//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the liveness probe and the proxy fallback
//! - Wire up middleware (request ID, tracing)
//! - Look up the route for each request and hand it to the dispatcher
//! - Turn pipeline errors into caller-visible responses
//! - Serve until shutdown, draining in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, GatewayConfig};
use crate::config::validation::validate_config;
use crate::discovery::{CachingRegistry, ConsulRegistry, ServiceRegistry};
use crate::error::StartupError;
use crate::health::{liveness, LIVENESS_PATH};
use crate::http::forwarder::Forwarder;
use crate::http::request::request_id;
use crate::load_balancer::{RequestCounter, RoundRobin};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::routing::{Dispatcher, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub dispatcher: Dispatcher,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    counter: Arc<RequestCounter>,
}

impl HttpServer {
    /// Create a server that resolves instances through the configured Consul agent.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let consul: Arc<dyn ServiceRegistry> = Arc::new(ConsulRegistry::new(&config.registry)?);
        let registry: Arc<dyn ServiceRegistry> = if config.registry.cache_ttl_ms > 0 {
            Arc::new(CachingRegistry::new(
                consul,
                Duration::from_millis(config.registry.cache_ttl_ms),
            ))
        } else {
            consul
        };
        Self::with_registry(config, registry)
    }

    /// Create a server backed by an arbitrary registry implementation.
    pub fn with_registry(
        config: GatewayConfig,
        registry: Arc<dyn ServiceRegistry>,
    ) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let routes = Arc::new(RouteTable::from_config(&config.routes).map_err(ConfigError::Validation)?);
        if routes.is_empty() {
            tracing::warn!("Route table is empty; every proxied request will get 404");
        }

        let counter = Arc::new(RequestCounter::new());
        let dispatcher = Dispatcher::new(
            registry,
            Arc::new(RoundRobin::new(counter.clone())),
            Forwarder::new(&config.timeouts),
            RetryPolicy::from_config(&config.retries),
        );

        let state = AppState { routes, dispatcher };
        let router = Self::build_router(state);

        Ok(Self {
            router,
            config,
            counter,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(LIVENESS_PATH, get(liveness))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The shared round-robin counter.
    pub fn counter(&self) -> Arc<RequestCounter> {
        self.counter.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            registry = %self.config.registry.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Looks up the route, then runs resolve → select → forward.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let route = match state.routes.lookup(&path) {
        Some(route) => route,
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request("none", 404, start_time);
            return (StatusCode::NOT_FOUND, "no matching route").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name,
        "Proxying request"
    );

    match state.dispatcher.dispatch(&route, request).await {
        Ok(response) => {
            metrics::record_request(&route.name, response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            if e.is_registry_failure() {
                tracing::warn!(request_id = %request_id, route = %route.name, service = %route.service, error = %e, "No upstream available");
            } else {
                tracing::error!(request_id = %request_id, route = %route.name, service = %route.service, error = %e, "Upstream error");
            }
            let response = e.into_response();
            metrics::record_request(&route.name, response.status().as_u16(), start_time);
            response
        }
    }
}
