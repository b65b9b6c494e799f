//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route table integrity (unique paths, known methods)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::health::LIVENESS_PATH;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route '{route}': path '{path}' must start with '/'")]
    RelativePath { route: String, path: String },

    #[error("route '{route}': path '{path}' is already routed")]
    DuplicatePath { route: String, path: String },

    #[error("route '{route}': path '{path}' is reserved for the liveness probe")]
    ReservedPath { route: String, path: String },

    #[error("route '{route}': service name is empty")]
    EmptyService { route: String },

    #[error("route '{route}': '{method}' is not a valid HTTP method")]
    InvalidMethod { route: String, method: String },

    #[error("registry base_url '{0}' is not an http(s) URL")]
    InvalidRegistryUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for route in &config.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }
        if route.path == LIVENESS_PATH {
            errors.push(ValidationError::ReservedPath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }
        if !seen.insert(route.path.as_str()) {
            errors.push(ValidationError::DuplicatePath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }
        if let Some(upstream) = &route.upstream_path {
            if !upstream.starts_with('/') {
                errors.push(ValidationError::RelativePath {
                    route: route.name.clone(),
                    path: upstream.clone(),
                });
            }
        }
        if route.service.trim().is_empty() {
            errors.push(ValidationError::EmptyService { route: route.name.clone() });
        }
        if let Some(method) = &route.method {
            if Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    route: route.name.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    match Url::parse(&config.registry.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidRegistryUrl(config.registry.base_url.clone())),
    }

    if config.registry.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("registry.timeout_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.upstream_secs"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroValue("retries.max_attempts"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, path: &str, service: &str, method: Option<&str>) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path: path.into(),
            service: service.into(),
            upstream_path: None,
            method: method.map(Into::into),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.routes = vec![
            route("a", "orders", "orders-svc", None),
            route("b", "/x", "", Some("BAD METHOD")),
            route("c", "/x", "x-svc", None),
            route("d", "/healthz", "h-svc", None),
        ];
        config.registry.base_url = "consul:8500".into();
        config.timeouts.upstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::RelativePath {
            route: "a".into(),
            path: "orders".into()
        }));
        assert!(errors.contains(&ValidationError::EmptyService { route: "b".into() }));
        assert!(errors.contains(&ValidationError::InvalidMethod {
            route: "b".into(),
            method: "BAD METHOD".into()
        }));
        assert!(errors.contains(&ValidationError::DuplicatePath {
            route: "c".into(),
            path: "/x".into()
        }));
        assert!(errors.contains(&ValidationError::ReservedPath {
            route: "d".into(),
            path: "/healthz".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidRegistryUrl("consul:8500".into())));
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.upstream_secs")));
    }
}
