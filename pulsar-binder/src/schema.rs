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

//! Typed payload decoding, resolved once at registration time.
//!
//! A [`Schema<T>`] pins down how inbound payload bytes become the handler's
//! declared payload type: raw bytes pass through, text is decoded as UTF-8,
//! anything else is UTF-8 plus JSON. The dispatch pipeline never inspects
//! types again after registration.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("failed to deserialize payload as {type_name}")]
    Json {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode recipe for one payload type.
pub struct Schema<T> {
    type_name: &'static str,
    decode: fn(&[u8]) -> Result<T, DecodeError>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Schema<T> {}

impl<T> Schema<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn decode(&self, payload: &[u8]) -> Result<T, DecodeError> {
        (self.decode)(payload)
    }
}

impl Schema<Vec<u8>> {
    /// Raw bytes, passed to the handler untouched.
    pub fn bytes() -> Self {
        Self {
            type_name: "bytes",
            decode: |payload| Ok(payload.to_vec()),
        }
    }
}

impl Schema<String> {
    /// UTF-8 text, no JSON involved.
    pub fn text() -> Self {
        Self {
            type_name: "text",
            decode: |payload| Ok(std::str::from_utf8(payload)?.to_owned()),
        }
    }
}

impl<T: DeserializeOwned> Schema<T> {
    /// UTF-8 text deserialized as JSON into `T`.
    pub fn json() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            decode: |payload| {
                let text = std::str::from_utf8(payload)?;
                serde_json::from_str(text).map_err(|source| DecodeError::Json {
                    type_name: std::any::type_name::<T>(),
                    source,
                })
            },
        }
    }
}
