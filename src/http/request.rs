//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request ID assigned at the edge
//! - Build the outbound request for the selected instance
//!
//! # Design Decisions
//! - Inbound headers are forwarded verbatim, except `Host`, which names the instance
//! - The inbound body is moved into the outbound request, never buffered
//! - The outbound HTTP version is chosen by the client, not copied

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};

use crate::discovery::ServiceInstance;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Extract the request ID, or `"unknown"` if the edge layer did not set one.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Absolute URI for `path_and_query` on `instance`.
pub fn upstream_uri(
    instance: &ServiceInstance,
    path_and_query: &str,
) -> Result<Uri, axum::http::uri::InvalidUri> {
    format!("http://{}{}", instance.authority(), path_and_query).parse()
}

/// Construct the request sent to the selected instance.
pub fn build_upstream_request(
    instance: &ServiceInstance,
    path_and_query: &str,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Request<Body>, axum::http::Error> {
    let uri = upstream_uri(instance, path_and_query)?;
    let mut request = Request::builder().method(method).uri(uri).body(body)?;

    *request.headers_mut() = headers;
    match HeaderValue::from_str(&instance.authority()) {
        Ok(host) => {
            request.headers_mut().insert(header::HOST, host);
        }
        Err(_) => {
            request.headers_mut().remove(header::HOST);
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_request_shape() {
        let instance = ServiceInstance::new("10.0.0.7", 8081);
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gateway.local"));
        headers.insert("x-trace-id", HeaderValue::from_static("abc"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let req = build_upstream_request(
            &instance,
            "/register?ref=mail",
            Method::PATCH,
            headers,
            Body::empty(),
        )
        .unwrap();

        assert_eq!(req.method(), Method::PATCH);
        assert_eq!(req.uri().to_string(), "http://10.0.0.7:8081/register?ref=mail");
        assert_eq!(req.headers()["host"], "10.0.0.7:8081");
        assert_eq!(req.headers()["x-trace-id"], "abc");
        assert_eq!(req.headers().get_all("accept").iter().count(), 2);
    }

    #[test]
    fn test_ipv6_instance_uri() {
        let instance = ServiceInstance::new("::1", 9000);
        let uri = upstream_uri(&instance, "/keys").unwrap();
        assert_eq!(uri.authority().unwrap().as_str(), "[::1]:9000");
        assert_eq!(uri.port_u16(), Some(9000));
    }

    #[test]
    fn test_request_id_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        assert_eq!(request_id(&headers), "req-1");
    }
}
