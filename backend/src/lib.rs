//! Residential community management backend.
//!
//! Hexagonal layout: `domain` holds entities, services and ports; `inbound`
//! exposes them over REST and WebSocket; `outbound` implements the ports for
//! PostgreSQL, process memory, the filesystem and Argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
