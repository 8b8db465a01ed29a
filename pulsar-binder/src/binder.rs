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

//! The binder facade: one owner for registries, activator and template.

use crate::client::MessagingClient;
use crate::config::BinderConfig;
use crate::control_plane::{ConsumerActivator, HandlerRegistry, ProducerRegistry};
use crate::data_plane::MessageTemplate;
use crate::error::BinderError;
use crate::routing::{NoopResolver, PlaceholderResolver};
use std::sync::Arc;
use tracing::info;

/// Wires the registries and the activator over one client.
///
/// Intended lifecycle: construct, register consumers and producers, then
/// [`activate_all`](Self::activate_all) once, and [`shutdown`](Self::shutdown)
/// when the process stops.
pub struct Binder {
    config: BinderConfig,
    handlers: Arc<HandlerRegistry>,
    producers: Arc<ProducerRegistry>,
    activator: ConsumerActivator,
    template: MessageTemplate,
}

impl Binder {
    pub fn new(client: Arc<dyn MessagingClient>, config: BinderConfig) -> Self {
        Self::with_placeholders(client, config, Arc::new(NoopResolver))
    }

    pub fn with_placeholders(
        client: Arc<dyn MessagingClient>,
        config: BinderConfig,
        placeholders: Arc<dyn PlaceholderResolver>,
    ) -> Self {
        let resolver = config.resolver();
        let producers = Arc::new(ProducerRegistry::new(
            Arc::clone(&client),
            resolver.clone(),
            Arc::clone(&placeholders),
        ));
        let activator = ConsumerActivator::new(
            client,
            resolver,
            placeholders,
            config.ack_timeout(),
        );
        Self {
            config,
            handlers: Arc::new(HandlerRegistry::new()),
            template: MessageTemplate::new(Arc::clone(&producers)),
            producers,
            activator,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn producers(&self) -> &ProducerRegistry {
        &self.producers
    }

    pub fn template(&self) -> MessageTemplate {
        self.template.clone()
    }

    /// Activates every registered consumer binding.
    ///
    /// A disabled binder skips activation entirely; registrations stay in
    /// place so a later enable could pick them up.
    pub async fn activate_all(&self) -> Result<(), BinderError> {
        if !self.config.enabled {
            info!("binder disabled; skipping consumer activation");
            return Ok(());
        }
        self.activator.activate_all(&self.handlers).await
    }

    /// Lifecycle state of one consumer binding, by registry name.
    pub async fn activation_state(
        &self,
        name: &str,
    ) -> Option<crate::control_plane::ActivationState> {
        self.activator.state(name).await
    }

    /// Closes every live consumer and producer.
    pub async fn shutdown(&self) -> Result<(), BinderError> {
        self.activator.shutdown().await;
        self.producers.shutdown().await
    }
}
