//! Consul health API client.
//!
//! # Responsibilities
//! - Query `/v1/health/service/<name>` with the passing-only filter
//! - Normalize entries into `ServiceInstance`s in response order
//! - Skip individually malformed entries instead of failing the lookup
//!
//! # Design Decisions
//! - The service name is pushed as an encoded path segment, never interpolated
//! - A non-2xx answer counts as the registry being unreachable
//! - An empty JSON array is a successful, empty lookup

use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::RegistryConfig;
use crate::discovery::{InstancePool, ServiceInstance, ServiceRegistry};
use crate::error::{GatewayError, StartupError};
use crate::observability::metrics;

/// One element of the health endpoint response. Only the fields the gateway
/// needs are decoded.
#[derive(Debug, Deserialize)]
struct HealthEntry {
    #[serde(rename = "Node", default)]
    node: Option<NodeEntry>,
    #[serde(rename = "Service")]
    service: ServiceEntry,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    #[serde(rename = "Address", default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "Port")]
    port: u16,
}

/// Registry client backed by the Consul HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    client: reqwest::Client,
    base_url: Url,
    passing_only: bool,
    datacenter: Option<String>,
}

impl ConsulRegistry {
    /// Create a client from registry configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self, StartupError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            base_url,
            passing_only: config.passing_only,
            datacenter: config.datacenter.clone(),
        })
    }

    /// Build the health query URL for a service.
    pub fn query_url(&self, service: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "health", "service", service]);
        }
        if self.passing_only || self.datacenter.is_some() {
            let mut query = url.query_pairs_mut();
            if self.passing_only {
                query.append_pair("passing", "true");
            }
            if let Some(dc) = &self.datacenter {
                query.append_pair("dc", dc);
            }
        }
        url
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    async fn resolve(&self, service: &str) -> Result<InstancePool, GatewayError> {
        let url = self.query_url(service);
        tracing::debug!(service = %service, url = %url, "Querying registry");

        let unreachable = |reason: String| GatewayError::RegistryUnreachable {
            service: service.to_string(),
            reason,
        };

        let result = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| unreachable(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(unreachable(format!("registry returned status {}", status)));
            }

            let body = response.bytes().await.map_err(|e| unreachable(e.to_string()))?;
            decode_pool(service, &body)
        }
        .await;

        let outcome = match &result {
            Ok(pool) if pool.is_empty() => "empty",
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_registry_lookup(service, outcome);

        result
    }
}

/// Decode a health endpoint body into an instance pool.
///
/// Entries that do not decode, or carry no usable address or port, are
/// skipped. If the body had entries and none survived, the whole response is
/// treated as malformed.
pub fn decode_pool(service: &str, body: &[u8]) -> Result<InstancePool, GatewayError> {
    let malformed = |reason: String| GatewayError::RegistryMalformedResponse {
        service: service.to_string(),
        reason,
    };

    let entries: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
    let total = entries.len();

    let pool: InstancePool = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value::<HealthEntry>(raw) {
            Ok(entry) => {
                let instance = to_instance(entry);
                if instance.is_none() {
                    tracing::warn!(service = %service, index, "Skipping registry entry without usable address or port");
                }
                instance
            }
            Err(e) => {
                tracing::warn!(service = %service, index, error = %e, "Skipping malformed registry entry");
                None
            }
        })
        .collect();

    if total > 0 && pool.is_empty() {
        return Err(malformed(format!("all {} entries were malformed", total)));
    }

    Ok(pool)
}

fn to_instance(entry: HealthEntry) -> Option<ServiceInstance> {
    if entry.service.port == 0 {
        return None;
    }

    // Consul leaves Service.Address empty when the service uses its node's address.
    let address = if entry.service.address.trim().is_empty() {
        entry.node.map(|n| n.address).unwrap_or_default()
    } else {
        entry.service.address
    };
    let address = address.trim();

    if address.is_empty() {
        return None;
    }
    Some(ServiceInstance::new(address, entry.service.port))
}
