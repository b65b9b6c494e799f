//! Retry-with-reselection policy.
//!
//! # Responsibilities
//! - Decide whether a failed attempt may be re-run through resolve → select → forward
//! - Provide the backoff between attempts
//!
//! # Design Decisions
//! - Disabled by default: one attempt against one instance
//! - Registry failures and empty pools are never retried
//! - Failing to connect is retryable for any method, since nothing was sent
//! - Any other upstream failure (broken connection, timeout) may have reached
//!   the instance, so it is retried only for idempotent methods
//! - Only requests with an empty body qualify; a streamed body cannot be replayed

use std::time::Duration;
use axum::http::Method;

use crate::config::RetryConfig;
use crate::error::GatewayError;
use crate::resilience::backoff::Backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// The default behavior: no retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::new(0, 0),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        if !config.enabled {
            return Self::single_attempt();
        }
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::new(config.base_delay_ms, config.max_delay_ms),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Whether attempt number `attempt` (1-based), which failed with `error`,
    /// may be followed by another one.
    pub fn should_retry(&self, attempt: u32, method: &Method, error: &GatewayError) -> bool {
        attempt < self.max_attempts && is_retryable(method, error)
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// Classify an attempt failure.
pub fn is_retryable(method: &Method, error: &GatewayError) -> bool {
    match error {
        GatewayError::UpstreamConnectFailed { .. } => true,
        GatewayError::UpstreamUnreachable { .. } | GatewayError::UpstreamTimeout { .. } => {
            method.is_idempotent()
        }
        _ => false,
    }
}
