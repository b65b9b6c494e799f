//! Dynamic-discovery API gateway library.
//!
//! Each inbound request on a configured route is proxied to one healthy
//! instance of the route's service, as reported by the discovery registry at
//! that moment and chosen round-robin.

pub mod config;
pub mod discovery;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
