//! Configuration loading utilities
//!
//! Snapshots the process environment once and combines it with the optional
//! local override file into the settings [`Store`].

use crate::{
    Result,
    config::{
        LocalOverrides,
        local::DEFAULT_LOCAL_FILE,
        settings::{Criteria, Store},
    },
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment value selecting the production variants
pub const PRODUCTION: &str = "production";

/// Runtime environment selector
pub const NODE_ENV: &str = "NODE_ENV";
/// Storage connection URL
pub const MONGO_URL: &str = "MONGO_URL";
/// Object-storage access key
pub const AWS_KEY: &str = "AWS_KEY";
/// Object-storage secret
pub const AWS_SECRET: &str = "AWS_SECRET";
/// Broker connection URL, may use the `rabbitmq://` scheme
pub const RABBITMQ_URL: &str = "RABBITMQ_URL";

/// Rewrite a `rabbitmq://` URL to the `amqp://` scheme
///
/// Missing and empty URLs stay absent rather than becoming a bare scheme.
pub fn rabbit_to_amqp(url: Option<&str>) -> Option<String> {
    url.filter(|url| !url.is_empty())
        .map(|url| url.replacen("rabbitmq://", "amqp://", 1))
}

/// Point-in-time copy of the environment variables the store reads
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Configuration loader for the settings store
#[derive(Debug)]
pub struct ConfigLoader {
    /// Local override file consulted outside production
    local_file: PathBuf,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            local_file: PathBuf::from(DEFAULT_LOCAL_FILE),
        }
    }

    /// Use a different local override file
    pub fn with_local_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_file = path.into();
        self
    }

    /// Local override file path
    pub fn local_file(&self) -> &Path {
        &self.local_file
    }

    /// Load the store from the live process environment
    pub fn load(&self) -> Result<Store> {
        self.load_from(&EnvSnapshot::capture())
    }

    /// Load the store from an environment snapshot
    pub fn load_from(&self, env: &EnvSnapshot) -> Result<Store> {
        let runtime_env = env.get(NODE_ENV);
        let local = if runtime_env == Some(PRODUCTION) {
            debug!("Production environment, skipping local overrides");
            LocalOverrides::default()
        } else {
            LocalOverrides::load_optional(&self.local_file)?
        };

        let store = Store::new(build_tree(env, &local), Criteria::for_env(runtime_env));
        info!(
            "Configuration loaded for environment {}",
            runtime_env.unwrap_or("default")
        );

        Ok(store)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble the filtered settings tree
fn build_tree(env: &EnvSnapshot, local: &LocalOverrides) -> Value {
    json!({
        "db": {
            "$filter": "env",
            "production": {
                "mongo": { "url": env.get(MONGO_URL) }
            },
            "$default": {
                "mongo": { "url": local.mongo_url }
            }
        },
        "storage": {
            "$filter": "env",
            "production": {
                "aws": {
                    "key": env.get(AWS_KEY),
                    "secret": env.get(AWS_SECRET)
                }
            },
            "$default": {
                "aws": {
                    "key": local.aws_key,
                    "secret": local.aws_secret
                }
            }
        },
        "queues": {
            "$filter": "env",
            "production": {
                "rabbit": { "url": rabbit_to_amqp(env.get(RABBITMQ_URL)) }
            },
            "$default": {
                "rabbit": { "url": local.rabbit_url }
            }
        },
        "logging": {
            "$filter": "env",
            "production": { "debug": false },
            "$default": { "debug": true }
        }
    })
}
