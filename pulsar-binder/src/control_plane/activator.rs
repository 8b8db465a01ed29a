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

//! Activation phase: registered bindings become live subscriptions.

use crate::client::{ClientConsumer, DeadLetterPolicy, MessagingClient, SubscriptionOptions};
use crate::control_plane::handler_registry::{
    ConsumerBinding, HandlerRegistry, DEFAULT_MAX_REDELIVER_COUNT,
};
use crate::data_plane::DispatchListener;
use crate::error::BinderError;
use crate::observability::events;
use crate::routing::{PlaceholderResolver, TopicResolver};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifecycle state of one binding, observable per registry name.
///
/// Unbound bindings have no entry; activation moves them through
/// `Configuring` into `Subscribed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Configuring,
    Subscribed,
    Failed,
}

/// Drives every registered [`ConsumerBinding`] into a live subscription and
/// owns the resulting consumer handles until shutdown.
pub struct ConsumerActivator {
    client: Arc<dyn MessagingClient>,
    resolver: TopicResolver,
    placeholders: Arc<dyn PlaceholderResolver>,
    /// Process-wide ack-timeout; `Duration::ZERO` leaves the client default.
    default_ack_timeout: Duration,
    consumers: Mutex<Vec<(String, Arc<dyn ClientConsumer>)>>,
    states: Mutex<HashMap<String, ActivationState>>,
}

impl ConsumerActivator {
    pub fn new(
        client: Arc<dyn MessagingClient>,
        resolver: TopicResolver,
        placeholders: Arc<dyn PlaceholderResolver>,
        default_ack_timeout: Duration,
    ) -> Self {
        Self {
            client,
            resolver,
            placeholders,
            default_ack_timeout,
            consumers: Mutex::new(Vec::new()),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Activates every binding in registry order, stopping at the first
    /// failure. Startup misconfiguration is fatal, not skippable.
    pub async fn activate_all(&self, registry: &HandlerRegistry) -> Result<(), BinderError> {
        for (name, binding) in registry.bindings() {
            self.activate(&name, &binding).await?;
        }
        Ok(())
    }

    /// Subscribes one binding and records the live handle.
    pub async fn activate(
        &self,
        name: &str,
        binding: &Arc<ConsumerBinding>,
    ) -> Result<(), BinderError> {
        self.set_state(name, ActivationState::Configuring).await;
        debug!(
            event = events::CONSUMER_SUBSCRIBE_START,
            consumer = name,
            "activating consumer binding"
        );

        let options = match self.subscription_options(name, binding) {
            Ok(options) => options,
            Err(error) => {
                self.set_state(name, ActivationState::Failed).await;
                return Err(error);
            }
        };
        let topic = options.topic.clone();
        let listener = Arc::new(DispatchListener::new(name, Arc::clone(binding)));

        match self.client.subscribe(options, listener).await {
            Ok(consumer) => {
                info!(
                    event = events::CONSUMER_SUBSCRIBED,
                    consumer = name,
                    topic = topic.as_str(),
                    "consumer subscribed"
                );
                self.consumers
                    .lock()
                    .await
                    .push((name.to_string(), consumer));
                self.set_state(name, ActivationState::Subscribed).await;
                Ok(())
            }
            Err(source) => {
                warn!(
                    event = events::CONSUMER_SUBSCRIBE_FAILED,
                    consumer = name,
                    topic = topic.as_str(),
                    error = %source,
                    "consumer subscription rejected by client"
                );
                self.set_state(name, ActivationState::Failed).await;
                Err(BinderError::InitFailed {
                    role: "consumer",
                    topic,
                    source,
                })
            }
        }
    }

    fn subscription_options(
        &self,
        name: &str,
        binding: &ConsumerBinding,
    ) -> Result<SubscriptionOptions, BinderError> {
        let spec = binding.spec();
        let declared = self.placeholders.resolve(&spec.topic);
        if declared.is_empty() {
            return Err(BinderError::EmptyTopic {
                consumer: name.to_string(),
            });
        }
        let tenant = spec.tenant.as_deref().map(|t| self.placeholders.resolve(t));
        let namespace = spec
            .namespace
            .as_deref()
            .map(|n| self.placeholders.resolve(n));
        let topic = self
            .resolver
            .resolve(tenant.as_deref(), namespace.as_deref(), &declared);
        let subscription_name = spec
            .subscription_name
            .clone()
            .unwrap_or_else(|| format!("subscription_{declared}"));
        let dead_letter = spec.retry_enabled.then(|| {
            self.derive_dead_letter_policy(
                binding,
                tenant.as_deref(),
                namespace.as_deref(),
                &subscription_name,
            )
        });

        Ok(SubscriptionOptions {
            topic,
            consumer_name: name.to_string(),
            subscription_name,
            subscription_kind: spec.subscription_kind,
            retry_enabled: spec.retry_enabled,
            dead_letter,
            ack_timeout: (!self.default_ack_timeout.is_zero()).then_some(self.default_ack_timeout),
            receiver_queue_size: spec.receiver_queue_size,
        })
    }

    /// Keeps explicitly configured retry/dead-letter topics verbatim. When the
    /// declaration is untouched (default redelivery budget, no topics) both
    /// topics are synthesized from the subscription name in the binding's
    /// tenant/namespace.
    fn derive_dead_letter_policy(
        &self,
        binding: &ConsumerBinding,
        tenant: Option<&str>,
        namespace: Option<&str>,
        subscription_name: &str,
    ) -> DeadLetterPolicy {
        let spec = &binding.spec().dead_letter;
        let untouched = spec.max_redeliver_count == DEFAULT_MAX_REDELIVER_COUNT
            && spec.retry_topic.is_empty()
            && spec.dead_letter_topic.is_empty();
        if untouched {
            let prefix = self.resolver.prefix(tenant, namespace);
            return DeadLetterPolicy {
                max_redeliver_count: Some(DEFAULT_MAX_REDELIVER_COUNT),
                retry_topic: Some(format!(
                    "{prefix}{subscription_name}{}",
                    self.resolver.retry_suffix()
                )),
                dead_letter_topic: Some(format!(
                    "{prefix}{subscription_name}{}",
                    self.resolver.dead_letter_suffix()
                )),
            };
        }
        DeadLetterPolicy {
            max_redeliver_count: Some(spec.max_redeliver_count),
            retry_topic: (!spec.retry_topic.is_empty()).then(|| spec.retry_topic.clone()),
            dead_letter_topic: (!spec.dead_letter_topic.is_empty())
                .then(|| spec.dead_letter_topic.clone()),
        }
    }

    async fn set_state(&self, name: &str, state: ActivationState) {
        self.states.lock().await.insert(name.to_string(), state);
    }

    /// Current lifecycle state of a binding; `None` until activation starts.
    pub async fn state(&self, name: &str) -> Option<ActivationState> {
        self.states.lock().await.get(name).copied()
    }

    /// Closes every live consumer. Close failures are logged and skipped so
    /// one broken handle cannot strand the rest.
    pub async fn shutdown(&self) {
        let mut consumers = self.consumers.lock().await;
        for (name, consumer) in consumers.drain(..) {
            if let Err(error) = consumer.close().await {
                warn!(
                    event = events::CONSUMER_CLOSE_FAILED,
                    consumer = name.as_str(),
                    error = %error,
                    "failed to close consumer"
                );
            }
        }
        self.states.lock().await.clear();
    }
}
