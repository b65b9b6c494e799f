//! Short-lived lookup cache in front of a registry.
//!
//! Only non-empty pools are cached. An empty answer or an error always goes
//! back to the registry on the next request, so "no healthy instance" is never
//! served from memory.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::discovery::{InstancePool, ServiceRegistry};
use crate::error::GatewayError;

#[derive(Debug, Clone)]
struct CachedPool {
    fetched_at: Instant,
    pool: InstancePool,
}

/// Registry decorator that keeps each service's last pool for `ttl`.
#[derive(Debug)]
pub struct CachingRegistry {
    inner: Arc<dyn ServiceRegistry>,
    ttl: Duration,
    entries: DashMap<String, CachedPool>,
}

impl CachingRegistry {
    pub fn new(inner: Arc<dyn ServiceRegistry>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Number of services with a cached pool (fresh or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fresh(&self, service: &str) -> Option<InstancePool> {
        let entry = self.entries.get(service)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.pool.clone())
        } else {
            None
        }
    }
}

#[async_trait]
impl ServiceRegistry for CachingRegistry {
    async fn resolve(&self, service: &str) -> Result<InstancePool, GatewayError> {
        if let Some(pool) = self.fresh(service) {
            tracing::trace!(service = %service, instances = pool.len(), "Registry cache hit");
            return Ok(pool);
        }

        let result = self.inner.resolve(service).await;
        match &result {
            Ok(pool) if !pool.is_empty() => {
                self.entries.insert(
                    service.to_string(),
                    CachedPool {
                        fetched_at: Instant::now(),
                        pool: pool.clone(),
                    },
                );
            }
            _ => {
                self.entries.remove(service);
            }
        }
        result
    }

    fn invalidate(&self, service: &str) {
        if self.entries.remove(service).is_some() {
            tracing::debug!(service = %service, "Registry cache entry invalidated");
        }
        self.inner.invalidate(service);
    }
}
