/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Trait seam towards the underlying pub/sub client.
//!
//! The binder never talks wire protocol. Everything below this boundary is an
//! opaque client: [`MessagingClient`] hands out [`ClientProducer`] and
//! [`ClientConsumer`] handles, and inbound messages arrive through the
//! [`MessageListener`] installed at subscribe time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Error surfaced by a client implementation.
///
/// The binder treats it as opaque text and wraps it with the offending topic
/// where that context exists.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Broker-assigned identity of a published message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound message as delivered by the client, payload still undecoded.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: MessageId,
    pub topic: String,
    pub payload: Vec<u8>,
    pub properties: HashMap<String, String>,
}

impl RawMessage {
    pub fn new(id: MessageId, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id,
            topic: topic.into(),
            payload,
            properties: HashMap::new(),
        }
    }
}

/// An outbound message: encoded payload plus optional delivery scheduling.
///
/// At most one of `deliver_after` / `deliver_at` is set by the template; the
/// client is responsible for honoring the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub payload: Vec<u8>,
    pub deliver_after: Option<Duration>,
    pub deliver_at: Option<SystemTime>,
}

impl OutboundMessage {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            deliver_after: None,
            deliver_at: None,
        }
    }

    pub fn deliver_after(mut self, after: Duration) -> Self {
        self.deliver_after = Some(after);
        self
    }

    pub fn deliver_at(mut self, at: SystemTime) -> Self {
        self.deliver_at = Some(at);
        self
    }
}

/// Subscription sharing model, mirroring the broker's modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionKind {
    Exclusive,
    /// Default, so delayed delivery keeps working across consumer instances.
    #[default]
    Shared,
    Failover,
    KeyShared,
}

/// Dead-letter routing handed to the client at subscribe time.
///
/// `None` fields are left to the client's own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeadLetterPolicy {
    pub max_redeliver_count: Option<u32>,
    pub retry_topic: Option<String>,
    pub dead_letter_topic: Option<String>,
}

/// Producer-side batching knobs, forwarded verbatim to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchingOptions {
    pub enabled: bool,
    pub max_publish_delay: Duration,
    pub max_messages: u32,
    pub max_bytes: u32,
}

impl Default for BatchingOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            max_publish_delay: Duration::from_millis(1),
            max_messages: 1000,
            max_bytes: 128 * 1024,
        }
    }
}

/// Fully resolved producer configuration, ready for the client.
#[derive(Debug, Clone)]
pub struct ProducerOptions {
    pub topic: String,
    pub producer_name: String,
    /// `None` means no send timeout (retry forever).
    pub send_timeout: Option<Duration>,
    pub block_if_queue_full: bool,
    pub batching: BatchingOptions,
}

/// Fully resolved subscription configuration, ready for the client.
#[derive(Debug, Clone)]
pub struct SubscriptionOptions {
    pub topic: String,
    pub consumer_name: String,
    pub subscription_name: String,
    pub subscription_kind: SubscriptionKind,
    pub retry_enabled: bool,
    pub dead_letter: Option<DeadLetterPolicy>,
    /// `None` leaves the client's own ack-timeout default untouched.
    pub ack_timeout: Option<Duration>,
    pub receiver_queue_size: u32,
}

/// A live producer handle owned by the producer registry.
#[async_trait]
pub trait ClientProducer: Send + Sync {
    fn topic(&self) -> &str;

    fn name(&self) -> &str;

    async fn send(&self, message: OutboundMessage) -> Result<MessageId, ClientError>;

    async fn close(&self) -> Result<(), ClientError>;
}

/// A live consumer handle owned by the activator for the process lifetime.
#[async_trait]
pub trait ClientConsumer: Send + Sync {
    fn topic(&self) -> &str;

    fn subscription(&self) -> &str;

    async fn ack(&self, id: &MessageId) -> Result<(), ClientError>;

    async fn nack(&self, id: &MessageId) -> Result<(), ClientError>;

    async fn close(&self) -> Result<(), ClientError>;
}

/// Callback installed on a subscription; invoked once per inbound message.
///
/// For a single consumer the client invokes this from a consistent context so
/// per-consumer ordering holds; nothing is guaranteed across consumers.
#[async_trait]
pub trait MessageListener: Send + Sync {
    async fn on_message(&self, consumer: Arc<dyn ClientConsumer>, message: RawMessage);
}

/// The opaque pub/sub client the binder drives.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn create_producer(
        &self,
        options: ProducerOptions,
    ) -> Result<Arc<dyn ClientProducer>, ClientError>;

    async fn subscribe(
        &self,
        options: SubscriptionOptions,
        listener: Arc<dyn MessageListener>,
    ) -> Result<Arc<dyn ClientConsumer>, ClientError>;
}
