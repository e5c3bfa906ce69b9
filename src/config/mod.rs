//! Configuration management for the tag publisher
//!
//! This module builds the environment-filtered settings tree once at startup
//! and exposes read-only, path-based access to it.

pub mod loader;
pub mod local;
pub mod settings;

pub use loader::{ConfigLoader, EnvSnapshot, rabbit_to_amqp};
pub use local::LocalOverrides;
pub use settings::{Criteria, Store};
