//! Response type definitions

use serde::{Deserialize, Serialize};

/// Ping response for health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server uptime in seconds
    pub server_uptime: u64,

    /// Server version
    pub version: String,

    /// Runtime environment the settings were resolved for
    pub environment: Option<String>,

    /// Exchange tag updates are published to
    pub exchange: String,
}

impl PingResponse {
    /// Create a new ping response
    pub fn new(server_uptime: u64, version: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            server_uptime,
            version: version.into(),
            environment: None,
            exchange: exchange.into(),
        }
    }

    /// Attach the runtime environment
    pub fn with_environment(mut self, environment: Option<&str>) -> Self {
        self.environment = environment.map(str::to_string);
        self
    }
}

/// Error response for API errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
