//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the application.

pub mod redact;
pub mod version;

pub use redact::redact_url;
pub use version::get_version;
