//! Tag update queue integration
//!
//! This module connects to the message broker, declares the durable
//! `tag.updates` exchange and hands request handlers a [`TagPublisher`]
//! capability for fire-and-forget publishing.

pub mod amqp;
pub mod broker;
pub mod plugin;

pub use amqp::AmqpClient;
pub use broker::{
    BrokerClient, BrokerConnection, Exchange, ExchangeDeclaration, TAG_UPDATES_EXCHANGE,
};
pub use plugin::{QueuesPlugin, TagPublisher};
