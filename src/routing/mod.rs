//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact path lookup → Route)
//!     → dispatcher.rs
//!         → registry resolve (service name from the route)
//!         → load balancer select
//!         → forwarder
//!     → Response or GatewayError
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile method policies and upstream paths
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Service names come from the route table, never from the caller
//! - Explicit no-match (404) rather than a silent default

pub mod dispatcher;
pub mod router;

pub use dispatcher::Dispatcher;
pub use router::{MethodPolicy, Route, RouteTable};
