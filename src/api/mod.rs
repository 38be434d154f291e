//! HTTP API layer: router, middleware, endpoints, shared types.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
