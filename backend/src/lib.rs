//! Cyberodyssey backend library.
//!
//! Hexagonal layout: `domain` holds entities, services, and ports; `inbound`
//! adapts HTTP onto the domain; `outbound` implements the ports against
//! PostgreSQL and in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
