//! Common test utilities and helpers
//!
//! This module provides an in-memory broker shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tag_publisher::{
    Result,
    queue::{BrokerClient, BrokerConnection, Exchange, ExchangeDeclaration},
};

/// A message handed to the in-memory broker
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub exchange: String,
    pub routing_key: String,
    pub body: serde_json::Value,
}

/// Everything the broker saw
#[derive(Debug, Default)]
pub struct BrokerLog {
    pub connected_urls: Vec<String>,
    pub declarations: Vec<ExchangeDeclaration>,
    pub published: Vec<Published>,
}

/// In-memory broker that becomes ready immediately
#[derive(Clone, Default)]
pub struct RecordingBroker {
    pub log: Arc<Mutex<BrokerLog>>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Published> {
        self.log.lock().unwrap().published.clone()
    }
}

pub struct RecordingConnection {
    log: Arc<Mutex<BrokerLog>>,
}

pub struct RecordingExchange {
    name: String,
    log: Arc<Mutex<BrokerLog>>,
}

#[async_trait]
impl BrokerClient for RecordingBroker {
    type Connection = RecordingConnection;

    async fn connect(&self, url: &str) -> Result<RecordingConnection> {
        self.log.lock().unwrap().connected_urls.push(url.to_string());
        Ok(RecordingConnection {
            log: Arc::clone(&self.log),
        })
    }
}

#[async_trait]
impl BrokerConnection for RecordingConnection {
    async fn declare_exchange(
        &self,
        declaration: &ExchangeDeclaration,
    ) -> Result<Arc<dyn Exchange>> {
        self.log
            .lock()
            .unwrap()
            .declarations
            .push(declaration.clone());
        Ok(Arc::new(RecordingExchange {
            name: declaration.name.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

#[async_trait]
impl Exchange for RecordingExchange {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, routing_key: &str, body: Vec<u8>) -> Result<()> {
        let body = serde_json::from_slice(&body)?;
        self.log.lock().unwrap().published.push(Published {
            exchange: self.name.clone(),
            routing_key: routing_key.to_string(),
            body,
        });
        Ok(())
    }
}

/// Broker whose connection never becomes ready
#[derive(Clone, Copy, Default)]
pub struct UnreachableBroker;

#[async_trait]
impl BrokerClient for UnreachableBroker {
    type Connection = RecordingConnection;

    async fn connect(&self, _url: &str) -> Result<RecordingConnection> {
        std::future::pending().await
    }
}

/// Broker that refuses connections outright
#[derive(Clone, Copy, Default)]
pub struct RefusingBroker;

#[async_trait]
impl BrokerClient for RefusingBroker {
    type Connection = RecordingConnection;

    async fn connect(&self, url: &str) -> Result<RecordingConnection> {
        Err(tag_publisher::Error::connection(format!(
            "connection refused: {url}"
        )))
    }
}
