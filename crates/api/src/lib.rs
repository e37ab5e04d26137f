//! HTTP API layer for newsdesk.
//!
//! This crate provides the REST API consumed by the portal's web client and
//! the CMS publish webhook:
//!
//! - **Endpoints**: likes, saves, follows, polls, notifications
//! - **Extractors**: required and optional caller identity
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
