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

//! Naming-policy layer.
//!
//! Owns canonical topic-address resolution and late-bound placeholder
//! substitution. Everything here is pure with respect to the client: no
//! producer or consumer is ever created from this layer.

mod placeholder;
mod topic_resolver;

pub use placeholder::{MapResolver, NoopResolver, PlaceholderResolver};
pub use topic_resolver::{
    TopicAddress, TopicInfo, TopicResolver, DEAD_QUEUE_SUFFIX, DEFAULT_SCHEME, RETRY_QUEUE_SUFFIX,
};
