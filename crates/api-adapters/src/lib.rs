//! fritter/crates/api-adapters/src/lib.rs
//!
//! HTTP surface over the services. Response shaping is always available;
//! the axum routers sit behind the `web-axum` feature.

pub mod dto;

#[cfg(feature = "web-axum")]
pub mod error;

#[cfg(feature = "web-axum")]
pub mod identity;

#[cfg(feature = "web-axum")]
pub mod routes;

#[cfg(feature = "web-axum")]
pub use routes::{router, AppState};
