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

//! Late-bound `${key}` substitution for topic/tenant/namespace expressions.
//!
//! Declared expressions may reference configuration values that are not
//! available at discovery time; substitution therefore happens during
//! activation, never during registration.

use std::collections::HashMap;

pub trait PlaceholderResolver: Send + Sync {
    /// Substitutes every `${key}` occurrence in `expression`.
    /// Unknown keys substitute to the empty string.
    fn resolve(&self, expression: &str) -> String;
}

/// Resolver for deployments without placeholder expressions.
#[derive(Debug, Default)]
pub struct NoopResolver;

impl PlaceholderResolver for NoopResolver {
    fn resolve(&self, expression: &str) -> String {
        expression.to_string()
    }
}

/// Map-backed resolver, typically filled from application configuration.
#[derive(Debug, Default)]
pub struct MapResolver {
    values: HashMap<String, String>,
}

impl MapResolver {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PlaceholderResolver for MapResolver {
    fn resolve(&self, expression: &str) -> String {
        let mut resolved = String::with_capacity(expression.len());
        let mut rest = expression;
        while let Some(start) = rest.find("${") {
            match rest[start..].find('}') {
                Some(end) => {
                    resolved.push_str(&rest[..start]);
                    let key = &rest[start + 2..start + end];
                    if let Some(value) = self.values.get(key) {
                        resolved.push_str(value);
                    }
                    rest = &rest[start + end + 1..];
                }
                None => break,
            }
        }
        resolved.push_str(rest);
        resolved
    }
}
