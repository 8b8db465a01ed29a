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

//! In-memory [`MessagingClient`] for exercising the binder without a broker.
//!
//! Sends deliver synchronously to every live subscription on the topic, and
//! the client records everything tests want to assert on: published messages,
//! ack/nack identities, and the exact subscription options each consumer was
//! opened with. Failure injection covers subscription rejection and
//! producer-close failure.

use async_trait::async_trait;
use pulsar_binder::client::{
    ClientConsumer, ClientError, ClientProducer, MessageId, MessageListener, MessagingClient,
    OutboundMessage, ProducerOptions, RawMessage, SubscriptionOptions,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

#[derive(Default)]
struct TopicState {
    consumers: Vec<(Arc<MemoryConsumer>, Arc<dyn MessageListener>)>,
    sent: Vec<OutboundMessage>,
}

#[derive(Default)]
struct Core {
    next_id: AtomicU64,
    topics: Mutex<HashMap<String, TopicState>>,
    reject_subscribe: StdMutex<HashSet<String>>,
    fail_close: StdMutex<HashSet<String>>,
}

impl Core {
    fn next_message_id(&self) -> MessageId {
        MessageId::new(format!("msg-{}", self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}

/// The in-memory client; cheap to clone, all clones share state.
#[derive(Clone, Default)]
pub struct MemoryClient {
    core: Arc<Core>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `subscribe` fail for the given resolved topic address.
    pub fn reject_subscribe_on(&self, topic: impl Into<String>) {
        self.core
            .reject_subscribe
            .lock()
            .expect("lock")
            .insert(topic.into());
    }

    /// Makes `close` fail for producers on the given resolved topic address.
    pub fn fail_close_on(&self, topic: impl Into<String>) {
        self.core
            .fail_close
            .lock()
            .expect("lock")
            .insert(topic.into());
    }

    /// Everything published to a topic, in send order.
    pub async fn sent(&self, topic: &str) -> Vec<OutboundMessage> {
        self.core
            .topics
            .lock()
            .await
            .get(topic)
            .map(|state| state.sent.clone())
            .unwrap_or_default()
    }

    /// Subscription options of every consumer opened on a topic.
    pub async fn subscriptions(&self, topic: &str) -> Vec<SubscriptionOptions> {
        self.core
            .topics
            .lock()
            .await
            .get(topic)
            .map(|state| {
                state
                    .consumers
                    .iter()
                    .map(|(consumer, _)| consumer.options.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn subscription_count(&self, topic: &str) -> usize {
        self.subscriptions(topic).await.len()
    }

    pub async fn acked(&self, topic: &str) -> Vec<MessageId> {
        self.ack_log(topic, |consumer| {
            consumer.acked.lock().expect("lock").clone()
        })
        .await
    }

    pub async fn nacked(&self, topic: &str) -> Vec<MessageId> {
        self.ack_log(topic, |consumer| {
            consumer.nacked.lock().expect("lock").clone()
        })
        .await
    }

    async fn ack_log(
        &self,
        topic: &str,
        read: impl Fn(&MemoryConsumer) -> Vec<MessageId>,
    ) -> Vec<MessageId> {
        self.core
            .topics
            .lock()
            .await
            .get(topic)
            .map(|state| {
                state
                    .consumers
                    .iter()
                    .flat_map(|(consumer, _)| read(consumer))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessagingClient for MemoryClient {
    async fn create_producer(
        &self,
        options: ProducerOptions,
    ) -> Result<Arc<dyn ClientProducer>, ClientError> {
        Ok(Arc::new(MemoryProducer {
            core: Arc::clone(&self.core),
            topic: options.topic,
            name: options.producer_name,
            closed: AtomicBool::new(false),
        }))
    }

    async fn subscribe(
        &self,
        options: SubscriptionOptions,
        listener: Arc<dyn MessageListener>,
    ) -> Result<Arc<dyn ClientConsumer>, ClientError> {
        if self
            .core
            .reject_subscribe
            .lock()
            .expect("lock")
            .contains(&options.topic)
        {
            return Err(ClientError::new(format!(
                "subscription rejected for topic {}",
                options.topic
            )));
        }
        let consumer = Arc::new(MemoryConsumer {
            options: options.clone(),
            acked: StdMutex::new(Vec::new()),
            nacked: StdMutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        });
        self.core
            .topics
            .lock()
            .await
            .entry(options.topic)
            .or_default()
            .consumers
            .push((Arc::clone(&consumer), listener));
        Ok(consumer)
    }
}

struct MemoryProducer {
    core: Arc<Core>,
    topic: String,
    name: String,
    closed: AtomicBool,
}

#[async_trait]
impl ClientProducer for MemoryProducer {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: OutboundMessage) -> Result<MessageId, ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::new("producer closed"));
        }
        let id = self.core.next_message_id();
        let listeners: Vec<_> = {
            let mut topics = self.core.topics.lock().await;
            let state = topics.entry(self.topic.clone()).or_default();
            state.sent.push(message.clone());
            state
                .consumers
                .iter()
                .filter(|(consumer, _)| !consumer.closed.load(Ordering::SeqCst))
                .map(|(consumer, listener)| {
                    (Arc::clone(consumer) as Arc<dyn ClientConsumer>, Arc::clone(listener))
                })
                .collect()
        };
        // Deliver outside the topic lock so handlers may send in turn.
        for (consumer, listener) in listeners {
            let raw = RawMessage::new(id.clone(), self.topic.clone(), message.payload.clone());
            listener.on_message(consumer, raw).await;
        }
        Ok(id)
    }

    async fn close(&self) -> Result<(), ClientError> {
        if self
            .core
            .fail_close
            .lock()
            .expect("lock")
            .contains(&self.topic)
        {
            return Err(ClientError::new(format!(
                "close failed for producer on {}",
                self.topic
            )));
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryConsumer {
    options: SubscriptionOptions,
    acked: StdMutex<Vec<MessageId>>,
    nacked: StdMutex<Vec<MessageId>>,
    closed: AtomicBool,
}

#[async_trait]
impl ClientConsumer for MemoryConsumer {
    fn topic(&self) -> &str {
        &self.options.topic
    }

    fn subscription(&self) -> &str {
        &self.options.subscription_name
    }

    async fn ack(&self, id: &MessageId) -> Result<(), ClientError> {
        self.acked.lock().expect("lock").push(id.clone());
        Ok(())
    }

    async fn nack(&self, id: &MessageId) -> Result<(), ClientError> {
        self.nacked.lock().expect("lock").push(id.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
