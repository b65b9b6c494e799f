//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, route lookup)
//!     → [routing::Dispatcher: resolve → select]
//!     → forwarder.rs (one outbound request, deadlines)
//!         → request.rs (outbound request shape)
//!         → response.rs (relay status, headers, streaming body)
//!     → Send to client
//! ```

pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use forwarder::Forwarder;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
