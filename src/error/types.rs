//! Error type definitions
//!
//! Defines the main error types used by the configuration store, the queue
//! plugin and the HTTP host.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the tag publisher
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broker connection or exchange declaration failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Broker did not become ready within the registration timeout
    #[error("Connection error: broker not ready after {timeout:?}")]
    ConnectTimeout { timeout: Duration },

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// AMQP protocol errors
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local override file parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a connection timeout error
    pub fn connect_timeout(timeout: Duration) -> Self {
        Self::ConnectTimeout { timeout }
    }

    /// Create a new server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}
