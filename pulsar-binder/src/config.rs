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

//! Process-wide binder configuration, loadable from JSON5.

use crate::error::BinderError;
use crate::routing::TopicResolver;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Connection and routing defaults shared by every producer and consumer.
///
/// Every field has a working default; a config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    pub service_url: String,
    /// Master switch: when false, activation is a no-op.
    pub enabled: bool,
    pub io_threads: u32,
    pub listener_threads: u32,
    pub connections_per_broker: u32,
    pub keep_alive_interval_secs: u64,
    pub connection_timeout_secs: u64,
    pub operation_timeout_secs: u64,
    pub starting_backoff_millis: u64,
    pub max_backoff_secs: u64,
    /// 0 leaves the client's own ack-timeout default untouched.
    pub ack_timeout_millis: u64,
    pub tenant: String,
    pub namespace: String,
    /// When false, synthesized retry/dead-letter suffixes are uppercased.
    pub lowercase_suffix: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            service_url: "pulsar://localhost:6650".to_string(),
            enabled: true,
            io_threads: 10,
            listener_threads: 10,
            connections_per_broker: 1,
            keep_alive_interval_secs: 30,
            connection_timeout_secs: 10,
            operation_timeout_secs: 30,
            starting_backoff_millis: 100,
            max_backoff_secs: 60,
            ack_timeout_millis: 0,
            tenant: "public".to_string(),
            namespace: "default".to_string(),
            lowercase_suffix: true,
        }
    }
}

impl BinderConfig {
    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self, BinderError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| BinderError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json5_str(&contents).map_err(|error| match error {
            BinderError::ConfigParse { source, .. } => BinderError::ConfigParse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json5_str(contents: &str) -> Result<Self, BinderError> {
        json5::from_str(contents).map_err(|source| BinderError::ConfigParse {
            path: "<inline>".to_string(),
            source,
        })
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn starting_backoff(&self) -> Duration {
        Duration::from_millis(self.starting_backoff_millis)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_millis)
    }

    /// Topic resolver seeded with this config's routing defaults.
    pub fn resolver(&self) -> TopicResolver {
        TopicResolver::new(
            self.tenant.clone(),
            self.namespace.clone(),
            self.lowercase_suffix,
        )
    }
}
