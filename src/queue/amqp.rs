//! AMQP broker client backed by lapin

use super::broker::{BrokerClient, BrokerConnection, Exchange, ExchangeDeclaration};
use crate::{Error, Result, utils::redact_url};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties,
    options::{BasicPublishOptions, ExchangeDeclareOptions},
    types::FieldTable,
};
use std::sync::Arc;

/// Persistent delivery mode for published messages
const PERSISTENT: u8 = 2;

/// Broker client speaking AMQP 0-9-1
#[derive(Debug, Clone, Copy, Default)]
pub struct AmqpClient;

impl AmqpClient {
    pub fn new() -> Self {
        Self
    }
}

/// Open AMQP connection with the channel used for declarations and publishing
pub struct AmqpConnection {
    connection: Arc<Connection>,
    channel: Channel,
}

#[async_trait]
impl BrokerClient for AmqpClient {
    type Connection = AmqpConnection;

    async fn connect(&self, url: &str) -> Result<AmqpConnection> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| {
                Error::connection(format!("failed to connect to {}: {}", redact_url(url), e))
            })?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| Error::connection(format!("failed to open channel: {}", e)))?;

        tracing::debug!("Opened AMQP channel {}", channel.id());
        Ok(AmqpConnection {
            connection: Arc::new(connection),
            channel,
        })
    }
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    async fn declare_exchange(
        &self,
        declaration: &ExchangeDeclaration,
    ) -> Result<Arc<dyn Exchange>> {
        let (kind, options) = declare_args(declaration);
        self.channel
            .exchange_declare(&declaration.name, kind, options, FieldTable::default())
            .await
            .map_err(|e| {
                Error::connection(format!(
                    "failed to declare exchange {}: {}",
                    declaration.name, e
                ))
            })?;

        Ok(Arc::new(AmqpExchange {
            name: declaration.name.clone(),
            channel: self.channel.clone(),
            _connection: Arc::clone(&self.connection),
        }))
    }
}

/// Exchange type and options sent with an `exchange.declare`
///
/// Tag exchanges are always topic exchanges.
fn declare_args(
    declaration: &ExchangeDeclaration,
) -> (lapin::ExchangeKind, ExchangeDeclareOptions) {
    let options = ExchangeDeclareOptions {
        durable: declaration.durable,
        auto_delete: declaration.auto_delete,
        ..ExchangeDeclareOptions::default()
    };
    (lapin::ExchangeKind::Topic, options)
}

/// Declared exchange; keeps the underlying connection alive
struct AmqpExchange {
    name: String,
    channel: Channel,
    _connection: Arc<Connection>,
}

#[async_trait]
impl Exchange for AmqpExchange {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, routing_key: &str, body: Vec<u8>) -> Result<()> {
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT);

        // Publisher confirms are not awaited
        let _confirm = self
            .channel
            .basic_publish(
                &self.name,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                properties,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_updates_declare_args() {
        let (kind, options) = declare_args(&ExchangeDeclaration::tag_updates());

        assert!(matches!(kind, lapin::ExchangeKind::Topic));
        assert!(options.durable);
        assert!(!options.auto_delete);
        assert!(!options.passive);
        assert!(!options.internal);
        assert!(!options.nowait);
    }

    #[test]
    fn test_declare_args_follow_declaration() {
        let declaration = ExchangeDeclaration {
            durable: false,
            auto_delete: true,
            ..ExchangeDeclaration::tag_updates()
        };
        let (_, options) = declare_args(&declaration);

        assert!(!options.durable);
        assert!(options.auto_delete);
    }
}
