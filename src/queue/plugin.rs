//! Queues plugin registration
//!
//! Registration connects to the broker, declares the tag updates exchange
//! and decorates the router with a [`TagPublisher`] extension. The whole
//! sequence is bounded by a timeout so an unreachable broker fails startup
//! instead of stalling it.

use super::broker::{BrokerClient, BrokerConnection, Exchange, ExchangeDeclaration};
use crate::{Error, Result, config::Store, utils::redact_url};
use axum::{Extension, Router};
use serde::Serialize;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

/// Plugin name reported at registration
pub const PLUGIN_NAME: &str = "27thvfw.queues";
/// Plugin version reported at registration
pub const PLUGIN_VERSION: &str = "1.0.0";
/// Settings path holding the broker URL
pub const BROKER_URL_PATH: &str = "/queues/rabbit/url";
/// Broker used when no URL is configured
pub const DEFAULT_BROKER_URL: &str = "amqp://127.0.0.1:5672/%2f";
/// Upper bound on connect plus exchange declaration
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability for publishing tag updates from request handlers
///
/// Cloning is cheap; every clone publishes through the same exchange.
#[derive(Clone)]
pub struct TagPublisher {
    exchange: Arc<dyn Exchange>,
}

impl TagPublisher {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// Name of the exchange messages are published to
    pub fn exchange_name(&self) -> &str {
        self.exchange.name()
    }

    /// Publish a tag update payload as JSON
    ///
    /// Fire-and-forget: the payload shape is not checked, nothing is
    /// retried and failures are only logged.
    pub async fn publish_tag_updates<T>(&self, tags: &T)
    where
        T: Serialize + ?Sized,
    {
        let body = match serde_json::to_vec(tags) {
            Ok(body) => body,
            Err(e) => {
                warn!("Dropping tag update that failed to serialize: {}", e);
                return;
            }
        };

        if let Err(e) = self.exchange.publish("", body).await {
            warn!(
                "Failed to publish tag update to {}: {}",
                self.exchange.name(),
                e
            );
        }
    }
}

impl fmt::Debug for TagPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagPublisher")
            .field("exchange", &self.exchange.name())
            .finish()
    }
}

/// Registers the tag updates exchange with the HTTP host
#[derive(Debug)]
pub struct QueuesPlugin<B> {
    client: B,
    declaration: ExchangeDeclaration,
    timeout: Duration,
}

impl<B: BrokerClient> QueuesPlugin<B> {
    /// Create a plugin using the given broker client
    pub fn new(client: B) -> Self {
        Self {
            client,
            declaration: ExchangeDeclaration::tag_updates(),
            timeout: DEFAULT_REGISTRATION_TIMEOUT,
        }
    }

    /// Override the registration timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn declaration(&self) -> &ExchangeDeclaration {
        &self.declaration
    }

    /// Connect, declare the exchange and return the publishing capability
    pub async fn open(&self, store: &Store) -> Result<TagPublisher> {
        let url = store.get_str(BROKER_URL_PATH).unwrap_or_else(|| {
            debug!("No broker URL configured, using {}", DEFAULT_BROKER_URL);
            DEFAULT_BROKER_URL.to_string()
        });

        info!(
            "Registering plugin {} v{} against {}",
            PLUGIN_NAME,
            PLUGIN_VERSION,
            redact_url(&url)
        );

        let exchange = tokio::time::timeout(self.timeout, self.connect_and_declare(&url))
            .await
            .map_err(|_| {
                error!(
                    "Broker at {} not ready after {:?}",
                    redact_url(&url),
                    self.timeout
                );
                Error::connect_timeout(self.timeout)
            })??;

        info!("Exchange {} open", exchange.name());
        Ok(TagPublisher::new(exchange))
    }

    /// Open the exchange and expose the publisher to every route of `router`
    ///
    /// Only routes already added to `router` see the extension.
    pub async fn register<S>(&self, router: Router<S>, store: &Store) -> Result<Router<S>>
    where
        S: Clone + Send + Sync + 'static,
    {
        let publisher = self.open(store).await?;
        Ok(router.layer(Extension(publisher)))
    }

    async fn connect_and_declare(&self, url: &str) -> Result<Arc<dyn Exchange>> {
        let connection = self.client.connect(url).await?;
        debug!("Broker connection ready");
        connection.declare_exchange(&self.declaration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Criteria, Store};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        urls: Vec<String>,
        published: Vec<(String, String, Vec<u8>)>,
    }

    #[derive(Clone, Default)]
    struct FakeBroker {
        log: Arc<Mutex<Log>>,
        stall: bool,
    }

    struct FakeConnection {
        log: Arc<Mutex<Log>>,
    }

    struct FakeExchange {
        name: String,
        log: Arc<Mutex<Log>>,
    }

    #[async_trait]
    impl BrokerClient for FakeBroker {
        type Connection = FakeConnection;

        async fn connect(&self, url: &str) -> Result<FakeConnection> {
            if self.stall {
                std::future::pending::<()>().await;
            }
            self.log.lock().unwrap().urls.push(url.to_string());
            Ok(FakeConnection {
                log: Arc::clone(&self.log),
            })
        }
    }

    #[async_trait]
    impl BrokerConnection for FakeConnection {
        async fn declare_exchange(
            &self,
            declaration: &ExchangeDeclaration,
        ) -> Result<Arc<dyn Exchange>> {
            Ok(Arc::new(FakeExchange {
                name: declaration.name.clone(),
                log: Arc::clone(&self.log),
            }))
        }
    }

    #[async_trait]
    impl Exchange for FakeExchange {
        fn name(&self) -> &str {
            &self.name
        }

        async fn publish(&self, routing_key: &str, body: Vec<u8>) -> Result<()> {
            self.log.lock().unwrap().published.push((
                self.name.clone(),
                routing_key.to_string(),
                body,
            ));
            Ok(())
        }
    }

    fn store_with_url(url: Option<&str>) -> Store {
        Store::new(
            json!({ "queues": { "rabbit": { "url": url } } }),
            Criteria::new(),
        )
    }

    #[tokio::test]
    async fn test_open_uses_configured_url() {
        let broker = FakeBroker::default();
        let plugin = QueuesPlugin::new(broker.clone());

        let publisher = plugin
            .open(&store_with_url(Some("amqp://broker/vhost")))
            .await
            .unwrap();

        assert_eq!(publisher.exchange_name(), "tag.updates");
        assert_eq!(broker.log.lock().unwrap().urls, vec!["amqp://broker/vhost"]);
    }

    #[tokio::test]
    async fn test_open_falls_back_to_local_broker() {
        let broker = FakeBroker::default();
        QueuesPlugin::new(broker.clone())
            .open(&store_with_url(None))
            .await
            .unwrap();

        assert_eq!(broker.log.lock().unwrap().urls, vec![DEFAULT_BROKER_URL]);
    }

    #[tokio::test]
    async fn test_open_times_out() {
        let broker = FakeBroker {
            stall: true,
            ..FakeBroker::default()
        };
        let plugin = QueuesPlugin::new(broker).with_timeout(Duration::from_millis(20));

        let err = plugin.open(&store_with_url(None)).await.unwrap_err();
        assert!(matches!(err, Error::ConnectTimeout { .. }));
    }

    #[tokio::test]
    async fn test_publish_serializes_payload() {
        let broker = FakeBroker::default();
        let publisher = QueuesPlugin::new(broker.clone())
            .open(&store_with_url(None))
            .await
            .unwrap();

        publisher
            .publish_tag_updates(&json!({ "id": 5, "tag": "x" }))
            .await;

        let log = broker.log.lock().unwrap();
        assert_eq!(log.published.len(), 1);
        let (exchange, routing_key, body) = &log.published[0];
        assert_eq!(exchange, "tag.updates");
        assert_eq!(routing_key, "");
        let payload: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(payload, json!({ "id": 5, "tag": "x" }));
    }

    #[test]
    fn test_plugin_identity() {
        assert_eq!(PLUGIN_NAME, "27thvfw.queues");
        assert_eq!(PLUGIN_VERSION, "1.0.0");
    }

    #[test]
    fn test_default_timeout() {
        let plugin = QueuesPlugin::new(FakeBroker::default());
        assert_eq!(plugin.timeout(), Duration::from_secs(30));
        assert_eq!(plugin.declaration(), &ExchangeDeclaration::tag_updates());
    }
}
