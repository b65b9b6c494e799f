//! Shared utilities for integration tests: a mock Consul agent, recording
//! backends and an in-process gateway, all on ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use discovery_gateway::load_balancer::RequestCounter;
use discovery_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Serve `router` on an ephemeral loopback port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A loopback port with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// In-memory stand-in for the Consul health API.
#[derive(Default)]
pub struct MockRegistry {
    services: RwLock<HashMap<String, Vec<SocketAddr>>>,
    fail_status: Mutex<Option<u16>>,
    pub lookups: AtomicUsize,
    pub queries: Mutex<Vec<HashMap<String, String>>>,
}

impl MockRegistry {
    pub fn set(&self, service: &str, instances: Vec<SocketAddr>) {
        self.services.write().unwrap().insert(service.to_string(), instances);
    }

    pub fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

async fn health_service(
    State(registry): State<Arc<MockRegistry>>,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    registry.lookups.fetch_add(1, Ordering::SeqCst);
    registry.queries.lock().unwrap().push(query);

    if let Some(status) = *registry.fail_status.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "registry failure").into_response();
    }

    let instances = registry
        .services
        .read()
        .unwrap()
        .get(&name)
        .cloned()
        .unwrap_or_default();

    let entries: Vec<_> = instances
        .iter()
        .enumerate()
        .map(|(i, addr)| {
            json!({
                "Node": { "Node": format!("node-{}", i), "Address": addr.ip().to_string() },
                "Service": {
                    "ID": format!("{}-{}", name, i),
                    "Service": name,
                    "Address": addr.ip().to_string(),
                    "Port": addr.port(),
                },
                "Checks": [],
            })
        })
        .collect();

    Json(entries).into_response()
}

/// Start a mock registry and return its address and state.
pub async fn start_mock_registry() -> (SocketAddr, Arc<MockRegistry>) {
    let registry = Arc::new(MockRegistry::default());
    let router = Router::new()
        .route("/v1/health/service/{name}", get(health_service))
        .with_state(registry.clone());
    (spawn_server(router).await, registry)
}

/// One request observed by a backend.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A backend that records requests and answers with its own name.
pub struct MockBackend {
    pub name: String,
    pub seen: Mutex<Vec<Seen>>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Seen> {
        self.seen.lock().unwrap().last().cloned()
    }
}

async fn record_and_answer(State(backend): State<Arc<MockBackend>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    backend.seen.lock().unwrap().push(Seen {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    });
    ([("x-backend", backend.name.clone())], backend.name.clone()).into_response()
}

/// Start a recording backend named `name`.
pub async fn start_backend(name: &str) -> (SocketAddr, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend {
        name: name.to_string(),
        seen: Mutex::new(Vec::new()),
    });
    let router = Router::new()
        .fallback(record_and_answer)
        .with_state(backend.clone());
    (spawn_server(router).await, backend)
}

/// A backend that reads each request, counts it, then closes the connection
/// without answering.
pub async fn start_hangup_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(AtomicUsize::new(0));
    let counted = received.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counted = counted.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                if matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {
                    counted.fetch_add(1, Ordering::SeqCst);
                }
                let _ = socket.shutdown().await;
            });
        }
    });
    (addr, received)
}

/// Gateway config pointed at `registry` with test-friendly settings.
pub fn gateway_config(registry: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.registry.base_url = format!("http://{}", registry);
    config.registry.timeout_secs = 2;
    config.timeouts.connect_secs = 2;
    config.timeouts.upstream_secs = 5;
    config.observability.metrics_enabled = false;
    config
}

/// A running gateway.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub counter: Arc<RequestCounter>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway in-process.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let server = HttpServer::new(config).unwrap();
    let counter = server.counter();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway { addr, counter, shutdown }
}

/// HTTP client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
