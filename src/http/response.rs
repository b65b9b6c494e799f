//! Response handling.
//!
//! # Responsibilities
//! - Relay the upstream status, headers and body to the caller
//! - Keep the body as a stream so large payloads are never held in memory
//!
//! Dropping the relayed body (caller went away) drops the upstream body with
//! it, which closes that upstream connection.

use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;

/// Turn an upstream response into one the server can send back unchanged.
pub fn relay(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();
    Response::from_parts(parts, Body::new(body))
}
