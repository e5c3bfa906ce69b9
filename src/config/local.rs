//! Local development overrides
//!
//! Developers keep connection details for their own machine in a TOML file
//! next to the working directory. The file is never read in production.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default location of the local override file
pub const DEFAULT_LOCAL_FILE: &str = "config.local.toml";

/// Values supplied by the local override file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalOverrides {
    /// Storage connection URL
    #[serde(alias = "mongoUrl")]
    pub mongo_url: Option<String>,
    /// Object-storage access key
    #[serde(alias = "awsKey")]
    pub aws_key: Option<String>,
    /// Object-storage secret
    #[serde(alias = "awsSecret")]
    pub aws_secret: Option<String>,
    /// Broker connection URL
    #[serde(alias = "rabbitUrl")]
    pub rabbit_url: Option<String>,
}

impl LocalOverrides {
    /// Parse overrides from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read overrides from `path`, or return empty overrides when it does not exist
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        info!("Loading local configuration overrides from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| {
            crate::Error::config(format!("Invalid local override file {:?}: {}", path, e))
        })
    }
}
