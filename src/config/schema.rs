//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Discovery registry settings.
    pub registry: RegistryConfig,

    /// Route table mapping inbound paths to services.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry-with-reselection policy.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            registry: RegistryConfig::default(),
            routes: default_routes(),
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// The built-in route table: user and key management services.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "login".to_string(),
            path: "/login".to_string(),
            service: "user-svc".to_string(),
            upstream_path: None,
            method: Some("POST".to_string()),
        },
        RouteConfig {
            name: "register".to_string(),
            path: "/register".to_string(),
            service: "user-svc".to_string(),
            upstream_path: None,
            method: None,
        },
        RouteConfig {
            name: "keys".to_string(),
            path: "/keys".to_string(),
            service: "keys-svc".to_string(),
            upstream_path: None,
            method: None,
        },
    ]
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Discovery registry (Consul) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry HTTP API.
    pub base_url: String,

    /// Only return instances whose checks are passing.
    pub passing_only: bool,

    /// Optional datacenter to query.
    pub datacenter: Option<String>,

    /// Registry request timeout in seconds.
    pub timeout_secs: u64,

    /// Lifetime of cached lookups in milliseconds. 0 disables caching.
    pub cache_ttl_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://consul:8500".to_string(),
            passing_only: true,
            datacenter: None,
            timeout_secs: 5,
            cache_ttl_ms: 0,
        }
    }
}

/// Route configuration mapping an inbound path to a service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Inbound path (exact match).
    pub path: String,

    /// Service name to resolve in the registry.
    pub service: String,

    /// Path requested on the instance. Defaults to `path`.
    #[serde(default)]
    pub upstream_path: Option<String>,

    /// Fixed outbound method. Absent means the inbound method passes through.
    #[serde(default)]
    pub method: Option<String>,
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for upstream response headers in seconds.
    pub upstream_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retry-with-reselection.
    pub enabled: bool,

    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 2,
            base_delay_ms: 50,
            max_delay_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
