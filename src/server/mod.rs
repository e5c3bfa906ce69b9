//! HTTP server
//!
//! Axum routes and handlers hosting the tag updates capability.

pub mod app;
pub mod handlers;

pub use app::{AppState, create_app, routes};
