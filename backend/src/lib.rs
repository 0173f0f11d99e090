//! Conduit blogging backend: accounts with bearer sessions, follow edges,
//! and articles served over a REST API.
//!
//! The crate is laid out hexagonally. [`domain`] holds entities, services,
//! and port traits; [`inbound`] adapts HTTP onto the services; [`outbound`]
//! implements the ports over PostgreSQL.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
