//! Broker abstractions
//!
//! The plugin only talks to the broker through these traits so that tests
//! can substitute in-memory doubles for a live AMQP server.

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Exchange receiving tag update notifications
pub const TAG_UPDATES_EXCHANGE: &str = "tag.updates";

/// Exchange properties sent with the declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDeclaration {
    pub name: String,
    pub durable: bool,
    pub auto_delete: bool,
}

impl ExchangeDeclaration {
    /// Durable, non auto-deleting exchange for tag updates
    pub fn tag_updates() -> Self {
        Self {
            name: TAG_UPDATES_EXCHANGE.to_string(),
            durable: true,
            auto_delete: false,
        }
    }
}

/// Opens connections to a broker
#[async_trait]
pub trait BrokerClient: Send + Sync {
    type Connection: BrokerConnection;

    /// Connect and wait until the connection is ready
    async fn connect(&self, url: &str) -> Result<Self::Connection>;
}

/// A ready broker connection
#[async_trait]
pub trait BrokerConnection: Send + Sync + 'static {
    /// Declare an exchange and wait until it is open
    async fn declare_exchange(&self, declaration: &ExchangeDeclaration)
    -> Result<Arc<dyn Exchange>>;
}

/// An open exchange that accepts messages
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Exchange name
    fn name(&self) -> &str;

    /// Hand a message to the broker without waiting for confirmation
    async fn publish(&self, routing_key: &str, body: Vec<u8>) -> Result<()>;
}
