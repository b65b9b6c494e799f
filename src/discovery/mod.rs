//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Route resolved → service name
//!     → consul.rs (GET /v1/health/service/<name>?passing=true)
//!     → decode entries, skip malformed ones
//!     → InstancePool (ordered as the registry returned it)
//!
//! Optional:
//!     cache.rs wraps any registry with a short TTL
//! ```
//!
//! # Design Decisions
//! - Pools are fetched per request and never mutated afterwards
//! - An empty pool is a valid answer, distinct from a registry failure
//! - Instances have no identity beyond address and port

pub mod cache;
pub mod consul;

use std::fmt;
use std::net::IpAddr;
use async_trait::async_trait;

use crate::error::GatewayError;

pub use cache::CachingRegistry;
pub use consul::ConsulRegistry;

/// One network-addressable backend believed healthy at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceInstance {
    pub address: String,
    pub port: u16,
}

impl ServiceInstance {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// `host:port` form usable in a URI authority. IPv6 literals are bracketed.
    pub fn authority(&self) -> String {
        match self.address.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]:{}", self.address, self.port),
            _ => format!("{}:{}", self.address, self.port),
        }
    }
}

impl fmt::Display for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

/// Instances produced by a single registry lookup.
pub type InstancePool = Vec<ServiceInstance>;

/// Read-only view of the discovery registry.
#[async_trait]
pub trait ServiceRegistry: Send + Sync + fmt::Debug {
    /// Return the instances currently advertising `service`.
    ///
    /// An empty pool is `Ok`; callers decide how to surface it.
    async fn resolve(&self, service: &str) -> Result<InstancePool, GatewayError>;

    /// Drop any locally held knowledge about `service`.
    fn invalidate(&self, _service: &str) {}
}
