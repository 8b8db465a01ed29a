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

//! Producer lifecycle ownership, keyed by resolved topic address.
//!
//! Producers reach the registry on two paths: declarative [`ProducerSpec`]s
//! registered at startup and already-built handles adopted imperatively. Both
//! land in the same map; a later registration for the same topic replaces the
//! earlier handle, closing it before the replacement becomes visible.

use crate::client::{
    BatchingOptions, ClientProducer, MessagingClient, ProducerOptions,
};
use crate::error::BinderError;
use crate::observability::events;
use crate::routing::{PlaceholderResolver, TopicResolver};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default producer send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Declared producer endpoint metadata.
#[derive(Debug, Clone)]
pub struct ProducerSpec {
    pub topic: String,
    pub producer_name: Option<String>,
    pub tenant: Option<String>,
    pub namespace: Option<String>,
    /// `Duration::ZERO` disables the timeout entirely.
    pub send_timeout: Duration,
    pub block_if_queue_full: bool,
    pub batching: BatchingOptions,
}

impl ProducerSpec {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            producer_name: None,
            tenant: None,
            namespace: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            block_if_queue_full: false,
            batching: BatchingOptions::default(),
        }
    }

    pub fn producer_name(mut self, name: impl Into<String>) -> Self {
        self.producer_name = Some(name.into());
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn block_if_queue_full(mut self, block: bool) -> Self {
        self.block_if_queue_full = block;
        self
    }

    pub fn batching(mut self, batching: BatchingOptions) -> Self {
        self.batching = batching;
        self
    }
}

/// Storage owner for live producer handles.
pub struct ProducerRegistry {
    client: Arc<dyn MessagingClient>,
    resolver: TopicResolver,
    placeholders: Arc<dyn PlaceholderResolver>,
    producers: Mutex<HashMap<String, Arc<dyn ClientProducer>>>,
}

impl ProducerRegistry {
    pub fn new(
        client: Arc<dyn MessagingClient>,
        resolver: TopicResolver,
        placeholders: Arc<dyn PlaceholderResolver>,
    ) -> Self {
        Self {
            client,
            resolver,
            placeholders,
            producers: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn resolver(&self) -> &TopicResolver {
        &self.resolver
    }

    /// Creates a producer from a declared spec and installs it.
    ///
    /// Returns the resolved topic address the producer is registered under.
    pub async fn register(&self, spec: ProducerSpec) -> Result<String, BinderError> {
        let declared = self.placeholders.resolve(&spec.topic);
        let topic = self.resolver.resolve(
            spec.tenant.as_deref(),
            spec.namespace.as_deref(),
            &declared,
        );
        let producer_name = spec
            .producer_name
            .clone()
            .unwrap_or_else(|| format!("{declared}-producer-{}", Uuid::new_v4()));

        let options = ProducerOptions {
            topic: topic.clone(),
            producer_name: producer_name.clone(),
            send_timeout: (!spec.send_timeout.is_zero()).then_some(spec.send_timeout),
            block_if_queue_full: spec.block_if_queue_full,
            batching: spec.batching.clone(),
        };
        let producer = self
            .client
            .create_producer(options)
            .await
            .map_err(|source| BinderError::InitFailed {
                role: "producer",
                topic: topic.clone(),
                source,
            })?;
        info!(
            event = events::PRODUCER_CREATED,
            topic = topic.as_str(),
            producer = producer_name.as_str(),
            "producer created"
        );

        self.install(topic.clone(), producer).await?;
        Ok(topic)
    }

    /// Adopts an externally built producer handle, keyed by its own topic.
    pub async fn adopt(&self, producer: Arc<dyn ClientProducer>) -> Result<String, BinderError> {
        let topic = producer.topic().to_string();
        debug!(
            event = events::PRODUCER_ADOPTED,
            topic = topic.as_str(),
            producer = producer.name(),
            "external producer adopted"
        );
        self.install(topic.clone(), producer).await?;
        Ok(topic)
    }

    /// Inserts under the registry lock, closing any displaced handle first so
    /// no send can reach the old producer once the new one is visible. If the
    /// old handle refuses to close, it stays registered and serving; the
    /// unused replacement is disposed of before the failure is surfaced.
    async fn install(
        &self,
        topic: String,
        producer: Arc<dyn ClientProducer>,
    ) -> Result<(), BinderError> {
        let mut producers = self.producers.lock().await;
        if let Some(old) = producers.get(&topic) {
            info!(
                event = events::PRODUCER_REPLACED,
                topic = topic.as_str(),
                old = old.name(),
                new = producer.name(),
                "replacing registered producer"
            );
            if let Err(source) = old.close().await {
                warn!(
                    event = events::PRODUCER_CLOSE_FAILED,
                    topic = topic.as_str(),
                    producer = old.name(),
                    error = %source,
                    "failed to close displaced producer; keeping it registered"
                );
                if let Err(error) = producer.close().await {
                    warn!(
                        event = events::PRODUCER_CLOSE_FAILED,
                        topic = topic.as_str(),
                        producer = producer.name(),
                        error = %error,
                        "failed to close unused replacement producer"
                    );
                }
                return Err(BinderError::CloseFailed { topic, source });
            }
        }
        producers.insert(topic, producer);
        Ok(())
    }

    /// Looks up the producer for a topic reference, resolving it with the
    /// global defaults first.
    pub async fn get(
        &self,
        tenant: Option<&str>,
        namespace: Option<&str>,
        topic: &str,
    ) -> Option<Arc<dyn ClientProducer>> {
        let resolved = self.resolver.resolve(tenant, namespace, topic);
        self.producers.lock().await.get(&resolved).cloned()
    }

    /// Resolved addresses of all registered producers.
    pub async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<_> = self.producers.lock().await.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Closes and drops every registered producer. One broken handle does not
    /// stop the rest from being closed; the first failure is surfaced after
    /// the sweep.
    pub async fn shutdown(&self) -> Result<(), BinderError> {
        let mut producers = self.producers.lock().await;
        let mut first_failure = None;
        for (topic, producer) in producers.drain() {
            if let Err(source) = producer.close().await {
                warn!(
                    event = events::PRODUCER_CLOSE_FAILED,
                    topic = topic.as_str(),
                    producer = producer.name(),
                    error = %source,
                    "failed to close producer during shutdown"
                );
                if first_failure.is_none() {
                    first_failure = Some(BinderError::CloseFailed { topic, source });
                }
            }
        }
        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
