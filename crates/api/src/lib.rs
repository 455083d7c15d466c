//! HTTP API layer for goty-rs.
//!
//! - **Endpoints**: categories, nominations, votes, games, users, uploads, revalidation
//! - **Extractors**: bearer-token authentication and admin guard
//! - **Middleware**: authentication and the public page cache
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
