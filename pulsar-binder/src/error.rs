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

//! Error taxonomy for the startup and send surfaces.
//!
//! Startup-time configuration errors are fatal to the affected component.
//! Per-message handler failures never appear here; they are isolated inside
//! the dispatch pipeline via negative-acknowledge.

use crate::client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinderError {
    /// A binding's topic expression resolved to an empty string.
    #[error("the consumer [{consumer}] does not have a topic")]
    EmptyTopic { consumer: String },

    /// The underlying client rejected producer or consumer creation.
    #[error("failed to initialize {role} for topic [{topic}]")]
    InitFailed {
        role: &'static str,
        topic: String,
        #[source]
        source: ClientError,
    },

    /// An outbound send referenced a topic with no registered producer.
    #[error("no such topic [{topic}]")]
    NoSuchTopic { topic: String },

    /// Payload could not be JSON-encoded.
    #[error("failed to encode payload as JSON")]
    Encode(#[from] serde_json::Error),

    /// An old producer handle could not be closed during replacement.
    #[error("failed to close producer for topic [{topic}]")]
    CloseFailed {
        topic: String,
        #[source]
        source: ClientError,
    },

    /// A detached send task panicked or was cancelled before completing.
    #[error("detached send task did not complete")]
    SendAborted(#[from] tokio::task::JoinError),

    /// Config file could not be read.
    #[error("unable to read config file [{path}]")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed.
    #[error("unable to parse config file [{path}]")]
    ConfigParse {
        path: String,
        #[source]
        source: json5::Error,
    },

    /// A send failed in the underlying client.
    #[error(transparent)]
    Client(#[from] ClientError),
}
