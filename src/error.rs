//! Gateway error taxonomy.
//!
//! Every failure on the proxy path ends up as one of these variants and is
//! converted into a caller-visible response at the dispatcher boundary. None of
//! them is fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body returned when no instance could be resolved or selected.
pub const NO_UPSTREAM_AVAILABLE: &str = "no upstream available";

/// Body returned when the selected instance failed.
pub const UPSTREAM_ERROR: &str = "upstream error";

/// Errors produced by the resolve → select → forward pipeline.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The registry could not be reached (transport failure or non-2xx status).
    #[error("registry unreachable while resolving '{service}': {reason}")]
    RegistryUnreachable { service: String, reason: String },

    /// The registry answered but the body could not be decoded.
    #[error("malformed registry response for '{service}': {reason}")]
    RegistryMalformedResponse { service: String, reason: String },

    /// The registry listed zero healthy instances.
    #[error("no healthy instance of '{service}'")]
    NoHealthyInstance { service: String },

    /// No connection to the selected instance could be established, so the
    /// request was never sent.
    #[error("could not connect to upstream {instance}: {reason}")]
    UpstreamConnectFailed { instance: String, reason: String },

    /// Transport failure on an established connection. The instance may
    /// already have received the request.
    #[error("upstream {instance} unreachable: {reason}")]
    UpstreamUnreachable { instance: String, reason: String },

    /// The selected instance did not send response headers before the deadline.
    #[error("upstream {instance} timed out after {timeout_secs}s")]
    UpstreamTimeout { instance: String, timeout_secs: u64 },
}

impl GatewayError {
    /// True for failures that happen before an instance is chosen.
    pub fn is_registry_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::RegistryUnreachable { .. }
                | GatewayError::RegistryMalformedResponse { .. }
                | GatewayError::NoHealthyInstance { .. }
        )
    }

    /// True for failures of the selected instance.
    pub fn is_upstream_failure(&self) -> bool {
        !self.is_registry_failure()
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RegistryUnreachable { .. } => "registry_unreachable",
            GatewayError::RegistryMalformedResponse { .. } => "registry_malformed",
            GatewayError::NoHealthyInstance { .. } => "no_healthy_instance",
            GatewayError::UpstreamConnectFailed { .. } => "upstream_connect_failed",
            GatewayError::UpstreamUnreachable { .. } => "upstream_unreachable",
            GatewayError::UpstreamTimeout { .. } => "upstream_timeout",
        }
    }

    /// Status code surfaced to the caller.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    /// Message surfaced to the caller.
    pub fn public_message(&self) -> &'static str {
        if self.is_registry_failure() {
            NO_UPSTREAM_AVAILABLE
        } else {
            UPSTREAM_ERROR
        }
    }
}

/// Errors raised while wiring the gateway together at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("invalid registry URL: {0}")]
    RegistryUrl(#[from] url::ParseError),

    #[error("failed to build registry client: {0}")]
    RegistryClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
