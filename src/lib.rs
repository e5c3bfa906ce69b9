//! Tag Publisher
//!
//! Application glue for the squadron web service: an environment-aware
//! configuration store and a queues plugin that publishes tag updates to a
//! durable AMQP exchange.
//!
//! # Architecture
//!
//! - **Configuration store**: resolved once at startup from environment
//!   variables (production) or a local `config.local.toml` (everything else)
//! - **Queues plugin**: connects to the broker, declares the `tag.updates`
//!   exchange and decorates the HTTP routes with a [`TagPublisher`]
//!
//! # Usage
//!
//! ```bash
//! NODE_ENV=production RABBITMQ_URL=rabbitmq://broker/vhost tag-publisher --port 8000
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use tag_publisher::{AmqpClient, ConfigLoader, QueuesPlugin};
//!
//! # async fn example() -> tag_publisher::Result<()> {
//! let store = ConfigLoader::new().load()?;
//! let publisher = QueuesPlugin::new(AmqpClient::new()).open(&store).await?;
//! publisher.publish_tag_updates(&serde_json::json!({ "id": 5, "tag": "x" })).await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod server;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Store};
pub use error::{Error, Result};
pub use queue::{AmqpClient, QueuesPlugin, TagPublisher};
pub use types::{ErrorResponse, PingResponse};
