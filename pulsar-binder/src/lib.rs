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

//! Declarative message routing over a pub/sub client.
//!
//! `pulsar-binder` sits between application handlers and an opaque
//! [`MessagingClient`]: consumers and producers are declared up front against
//! logical topic names, a single activation step turns the declarations into
//! live subscriptions, and a [`MessageTemplate`] provides the outbound send
//! surface. Topic names resolve to canonical `scheme://tenant/namespace/topic`
//! addresses; handler failures are isolated per message via
//! negative-acknowledge.
//!
//! ```
//! use pulsar_binder::{
//!     Binder, BinderConfig, ConsumerSpec, Handler, MessagingClient, ProducerSpec, Schema,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pulsar_binder::BinderError> {
//! let client: Arc<dyn MessagingClient> = Arc::new(memory_client::MemoryClient::new());
//! let binder = Binder::new(client, BinderConfig::default());
//!
//! binder.handlers().register_consumer(
//!     ConsumerSpec::new("orders"),
//!     Schema::text(),
//!     Handler::payload_only(|text: String| async move {
//!         println!("received: {text}");
//!         Ok(())
//!     }),
//! );
//! binder.activate_all().await?;
//!
//! binder.producers().register(ProducerSpec::new("orders")).await?;
//! binder.template().send("orders", "hello").await?;
//! binder.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod binder;
pub mod client;
mod config;
pub mod control_plane;
pub mod data_plane;
mod error;
pub mod observability;
pub mod routing;
mod schema;

pub use binder::Binder;
pub use client::{
    BatchingOptions, ClientConsumer, ClientError, ClientProducer, DeadLetterPolicy, MessageId,
    MessageListener, MessagingClient, OutboundMessage, ProducerOptions, RawMessage,
    SubscriptionKind, SubscriptionOptions,
};
pub use config::BinderConfig;
pub use control_plane::{
    ActivationState, ConsumerActivator, ConsumerBinding, ConsumerSpec, DeadLetterSpec, Handler,
    HandlerError, HandlerRegistry, ProducerRegistry, ProducerSpec, DEFAULT_MAX_REDELIVER_COUNT,
    DEFAULT_RECEIVER_QUEUE_SIZE, DEFAULT_SEND_TIMEOUT,
};
pub use data_plane::{DispatchListener, MessageTemplate, Payload};
pub use error::BinderError;
pub use routing::{
    MapResolver, NoopResolver, PlaceholderResolver, TopicAddress, TopicInfo, TopicResolver,
};
pub use schema::{DecodeError, Schema};
