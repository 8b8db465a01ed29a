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

//! Control-plane layer.
//!
//! Owns the two-phase startup lifecycle: registration of consumer bindings
//! and producer specs first, then activation that turns them into live client
//! handles. Registries are process-scoped storage owners; all shared mutable
//! state lives behind them.

mod activator;
mod handler_registry;
mod producer_registry;

pub use activator::{ActivationState, ConsumerActivator};
pub use handler_registry::{
    ConsumerBinding, ConsumerSpec, DeadLetterSpec, Handler, HandlerError, HandlerRegistry,
    DEFAULT_MAX_REDELIVER_COUNT, DEFAULT_RECEIVER_QUEUE_SIZE,
};
pub use producer_registry::{ProducerRegistry, ProducerSpec, DEFAULT_SEND_TIMEOUT};
