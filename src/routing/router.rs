//! Route table.
//!
//! # Responsibilities
//! - Compile `RouteConfig`s into immutable routes
//! - Look up the route for an inbound path
//! - Resolve the outbound method from the route's declared policy
//!
//! # Design Decisions
//! - Exact path matching, O(1) via HashMap
//! - Immutable after construction (thread-safe without locks)
//! - Method handling is declared per route, never inferred from the path

use std::collections::HashMap;
use std::sync::Arc;
use axum::http::Method;

use crate::config::RouteConfig;
use crate::config::validation::ValidationError;

/// How a route chooses the outbound HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPolicy {
    /// Forward the inbound method unchanged.
    PassThrough,
    /// Always use this method, whatever the caller sent.
    Fixed(Method),
}

impl MethodPolicy {
    pub fn outbound(&self, inbound: &Method) -> Method {
        match self {
            MethodPolicy::PassThrough => inbound.clone(),
            MethodPolicy::Fixed(method) => method.clone(),
        }
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: String,
    /// Inbound path.
    pub path: String,
    /// Registry service name.
    pub service: String,
    /// Path requested on the selected instance.
    pub upstream_path: String,
    pub method: MethodPolicy,
}

impl Route {
    pub fn from_config(config: &RouteConfig) -> Result<Self, ValidationError> {
        let method = match &config.method {
            None => MethodPolicy::PassThrough,
            Some(raw) => Method::from_bytes(raw.as_bytes())
                .map(MethodPolicy::Fixed)
                .map_err(|_| ValidationError::InvalidMethod {
                    route: config.name.clone(),
                    method: raw.clone(),
                })?,
        };

        Ok(Self {
            name: config.name.clone(),
            path: config.path.clone(),
            service: config.service.clone(),
            upstream_path: config
                .upstream_path
                .clone()
                .unwrap_or_else(|| config.path.clone()),
            method,
        })
    }

    /// Upstream path with the inbound query string appended.
    pub fn upstream_target(&self, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.upstream_path, q),
            _ => self.upstream_path.clone(),
        }
    }
}

/// Immutable path → route map.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<Route>>,
}

impl RouteTable {
    /// Compile every route, returning all compilation errors at once.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut routes = HashMap::new();
        let mut errors = Vec::new();

        for config in configs {
            match Route::from_config(config) {
                Ok(route) => {
                    tracing::debug!(
                        route = %route.name,
                        path = %route.path,
                        service = %route.service,
                        method = ?route.method,
                        "Route compiled"
                    );
                    routes.insert(route.path.clone(), Arc::new(route));
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Self { routes })
        } else {
            Err(errors)
        }
    }

    pub fn lookup(&self, path: &str) -> Option<Arc<Route>> {
        self.routes.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
