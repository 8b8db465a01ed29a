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

//! Consumer declaration and the uniquely-named binding registry.
//!
//! Registration is the discovery phase of the two-phase startup: it validates
//! and stores [`ConsumerBinding`]s but never opens a subscription. The
//! activator consumes the registry afterwards.

use crate::client::{ClientConsumer, RawMessage, SubscriptionKind};
use crate::observability::events;
use crate::schema::Schema;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default redelivery budget before a message is routed to the dead-letter topic.
pub const DEFAULT_MAX_REDELIVER_COUNT: u32 = 16;

/// Default number of messages the client may prefetch per consumer.
pub const DEFAULT_RECEIVER_QUEUE_SIZE: u32 = 1000;

/// Error type handlers may fail with; any failure negative-acknowledges the message.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type HandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// Dead-letter/retry declaration attached to a consumer spec.
///
/// Empty topic strings mean "not explicitly configured"; the activator then
/// derives a policy (see `ConsumerActivator`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterSpec {
    pub max_redeliver_count: u32,
    pub retry_topic: String,
    pub dead_letter_topic: String,
}

impl Default for DeadLetterSpec {
    fn default() -> Self {
        Self {
            max_redeliver_count: DEFAULT_MAX_REDELIVER_COUNT,
            retry_topic: String::new(),
            dead_letter_topic: String::new(),
        }
    }
}

impl DeadLetterSpec {
    pub fn max_redeliver_count(mut self, count: u32) -> Self {
        self.max_redeliver_count = count;
        self
    }

    pub fn retry_topic(mut self, topic: impl Into<String>) -> Self {
        self.retry_topic = topic.into();
        self
    }

    pub fn dead_letter_topic(mut self, topic: impl Into<String>) -> Self {
        self.dead_letter_topic = topic.into();
        self
    }
}

/// Declared consumer endpoint metadata.
///
/// The topic (and tenant/namespace overrides) may contain `${...}`
/// placeholders; they stay unresolved until activation.
#[derive(Debug, Clone)]
pub struct ConsumerSpec {
    pub topic: String,
    pub subscription_kind: SubscriptionKind,
    pub subscription_name: Option<String>,
    pub retry_enabled: bool,
    pub dead_letter: DeadLetterSpec,
    pub consumer_name: Option<String>,
    pub tenant: Option<String>,
    pub namespace: Option<String>,
    pub receiver_queue_size: u32,
}

impl ConsumerSpec {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            subscription_kind: SubscriptionKind::default(),
            subscription_name: None,
            retry_enabled: true,
            dead_letter: DeadLetterSpec::default(),
            consumer_name: None,
            tenant: None,
            namespace: None,
            receiver_queue_size: DEFAULT_RECEIVER_QUEUE_SIZE,
        }
    }

    pub fn subscription_kind(mut self, kind: SubscriptionKind) -> Self {
        self.subscription_kind = kind;
        self
    }

    pub fn subscription_name(mut self, name: impl Into<String>) -> Self {
        self.subscription_name = Some(name.into());
        self
    }

    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    pub fn dead_letter(mut self, spec: DeadLetterSpec) -> Self {
        self.dead_letter = spec;
        self
    }

    /// Explicit logical name; must be globally unique if given.
    pub fn consumer_name(mut self, name: impl Into<String>) -> Self {
        self.consumer_name = Some(name.into());
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

    pub fn receiver_queue_size(mut self, size: u32) -> Self {
        self.receiver_queue_size = size;
        self
    }
}

/// Typed handler, selected once at registration time.
///
/// Dispatch never inspects arity or types again: the variant decides whether
/// the consumer handle and raw message accompany the decoded payload.
pub enum Handler<T> {
    PayloadOnly(Box<dyn Fn(T) -> HandlerFuture + Send + Sync>),
    WithContext(Box<dyn Fn(T, Arc<dyn ClientConsumer>, RawMessage) -> HandlerFuture + Send + Sync>),
}

impl<T> Handler<T> {
    pub fn payload_only<F, Fut>(handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Handler::PayloadOnly(Box::new(move |payload| Box::pin(handler(payload))))
    }

    pub fn with_context<F, Fut>(handler: F) -> Self
    where
        F: Fn(T, Arc<dyn ClientConsumer>, RawMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Handler::WithContext(Box::new(move |payload, consumer, message| {
            Box::pin(handler(payload, consumer, message))
        }))
    }
}

pub(crate) type DispatchFn =
    Arc<dyn Fn(Arc<dyn ClientConsumer>, RawMessage) -> HandlerFuture + Send + Sync>;

/// A declared consumer with its decode/invoke path fully resolved.
///
/// Immutable once created; the activator turns it into a live subscription.
pub struct ConsumerBinding {
    name: String,
    spec: ConsumerSpec,
    payload_type: &'static str,
    pub(crate) dispatch: DispatchFn,
}

impl ConsumerBinding {
    /// Name the binding was registered under (before any collision rename).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ConsumerSpec {
        &self.spec
    }

    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }
}

fn make_dispatch<T: Send + 'static>(schema: Schema<T>, handler: Handler<T>) -> DispatchFn {
    let handler = Arc::new(handler);
    Arc::new(move |consumer, message| {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let payload = schema.decode(&message.payload).map_err(HandlerError::from)?;
            match handler.as_ref() {
                Handler::PayloadOnly(call) => call(payload).await,
                Handler::WithContext(call) => call(payload, consumer, message).await,
            }
        })
    })
}

/// Storage owner for the logical-name -> binding map.
///
/// Safe under concurrent registration from multiple startup threads: the
/// rename-then-insert collision sequence runs atomically under one lock.
#[derive(Default)]
pub struct HandlerRegistry {
    bindings: Mutex<HashMap<String, Arc<ConsumerBinding>>>,
    rename_index: AtomicU64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer declaration with its schema and handler.
    ///
    /// Returns the canonical logical name. On a name collision the new
    /// binding wins the canonical slot and the previous one is retained
    /// under a `<name>_<n>` key; no binding is ever silently dropped.
    pub fn register_consumer<T: Send + 'static>(
        &self,
        spec: ConsumerSpec,
        schema: Schema<T>,
        handler: Handler<T>,
    ) -> String {
        let name = spec
            .consumer_name
            .clone()
            .unwrap_or_else(|| format!("{}({})", spec.topic, schema.type_name()));
        let binding = Arc::new(ConsumerBinding {
            name: name.clone(),
            payload_type: schema.type_name(),
            dispatch: make_dispatch(schema, handler),
            spec,
        });

        let mut bindings = self.bindings.lock().expect("binding map lock poisoned");
        if let Some(previous) = bindings.insert(name.clone(), binding) {
            let mut renamed = self.next_rename(&name);
            while bindings.contains_key(&renamed) {
                renamed = self.next_rename(&name);
            }
            debug!(
                event = events::BINDING_RENAMED,
                consumer = name.as_str(),
                renamed = renamed.as_str(),
                "duplicate consumer name; previous binding retained under suffixed name"
            );
            bindings.insert(renamed, previous);
        } else {
            debug!(
                event = events::BINDING_REGISTERED,
                consumer = name.as_str(),
                "consumer binding registered"
            );
        }
        name
    }

    fn next_rename(&self, name: &str) -> String {
        format!("{name}_{}", self.rename_index.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConsumerBinding>> {
        self.bindings
            .lock()
            .expect("binding map lock poisoned")
            .get(name)
            .cloned()
    }

    /// Snapshot of all bindings keyed by their registry name.
    pub fn bindings(&self) -> Vec<(String, Arc<ConsumerBinding>)> {
        let bindings = self.bindings.lock().expect("binding map lock poisoned");
        let mut snapshot: Vec<_> = bindings
            .iter()
            .map(|(name, binding)| (name.clone(), Arc::clone(binding)))
            .collect();
        // Deterministic activation order.
        snapshot.sort_by(|(a, _), (b, _)| a.cmp(b));
        snapshot
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().expect("binding map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
