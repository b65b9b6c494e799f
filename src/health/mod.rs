//! Gateway liveness probe.
//!
//! Reports only that the process is up and serving. It performs no registry
//! or upstream checks.

/// Path of the liveness endpoint. Routes may not reuse it.
pub const LIVENESS_PATH: &str = "/healthz";

/// Fixed liveness response.
pub async fn liveness() -> &'static str {
    "ok"
}
