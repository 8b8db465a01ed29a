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

//! Inbound dispatch pipeline: decode, invoke, acknowledge.
//!
//! A handler failure (including a decode failure) negative-acknowledges the
//! message and is otherwise isolated: the subscription stays live and the
//! next message is processed normally.

use crate::client::{ClientConsumer, MessageListener, RawMessage};
use crate::control_plane::ConsumerBinding;
use crate::observability::events;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, warn};

/// The listener installed on every activated subscription.
pub struct DispatchListener {
    name: String,
    binding: Arc<ConsumerBinding>,
    failures: AtomicU64,
}

impl DispatchListener {
    pub fn new(name: impl Into<String>, binding: Arc<ConsumerBinding>) -> Self {
        Self {
            name: name.into(),
            binding,
            failures: AtomicU64::new(0),
        }
    }

    /// Count of messages that failed decode or handler invocation.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessageListener for DispatchListener {
    async fn on_message(&self, consumer: Arc<dyn ClientConsumer>, message: RawMessage) {
        let id = message.id.clone();
        match (self.binding.dispatch)(Arc::clone(&consumer), message).await {
            Ok(()) => {
                // The message was processed; an ack failure means at-least-once
                // redelivery, not a handler problem.
                if let Err(ack_error) = consumer.ack(&id).await {
                    warn!(
                        event = events::DISPATCH_ACK_FAILED,
                        consumer = self.name.as_str(),
                        id = %id,
                        error = %ack_error,
                        "failed to acknowledge processed message"
                    );
                }
            }
            Err(handler_error) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    event = events::DISPATCH_FAILED,
                    consumer = self.name.as_str(),
                    id = %id,
                    error = %handler_error,
                    "handler failed; message negative-acknowledged"
                );
                if let Err(nack_error) = consumer.nack(&id).await {
                    warn!(
                        event = events::DISPATCH_NACK_FAILED,
                        consumer = self.name.as_str(),
                        id = %id,
                        error = %nack_error,
                        "failed to negative-acknowledge message"
                    );
                }
            }
        }
    }
}
