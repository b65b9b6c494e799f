//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Registry lookup → InstancePool
//!     → round_robin.rs (ticket from counter.rs, index = ticket mod len)
//!     → Return one instance or NoHealthyInstance
//! ```
//!
//! # Design Decisions
//! - The only shared mutable state is the atomic request counter
//! - Selectors never remember pool identity; the ring is re-derived per call
//! - Empty pools fail distinctly from forwarding errors

pub mod counter;
pub mod round_robin;

use std::fmt;

use crate::discovery::ServiceInstance;
use crate::error::GatewayError;

pub use counter::RequestCounter;
pub use round_robin::RoundRobin;

/// Strategy for picking one instance out of a freshly resolved pool.
pub trait LoadBalancer: Send + Sync + fmt::Debug {
    /// Pick an instance, or `None` when the pool is empty.
    fn next_instance<'a>(&self, pool: &'a [ServiceInstance]) -> Option<&'a ServiceInstance>;
}

/// Select an instance of `service`, failing with `NoHealthyInstance` on an empty pool.
pub fn select(
    balancer: &dyn LoadBalancer,
    service: &str,
    pool: &[ServiceInstance],
) -> Result<ServiceInstance, GatewayError> {
    balancer
        .next_instance(pool)
        .cloned()
        .ok_or_else(|| GatewayError::NoHealthyInstance {
            service: service.to_string(),
        })
}
