//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt failed:
//!     → retries.rs (retryable? attempts left?)
//!     → backoff.rs (exponential delay + jitter)
//!     → dispatcher re-runs resolve → select → forward
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline (registry client timeout, forwarder timeout)
//! - Retrying is an explicit opt-in policy, never implicit failover

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
